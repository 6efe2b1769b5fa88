//! Output types of the linking engine
//!
//! `MatchedTransfer` is the intermediate result produced by the matcher;
//! `LinkedTransfer` is the enriched, persistence-ready record handed to the
//! sink. Classification outcomes (`DiscountRate`, `DiscountTier`,
//! `Relationship`) are closed enumerations so every possible label is
//! visible at the type level.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::event::{Event, FareProgram, LinkId};

/// A transfer event together with its matched mother, if any
///
/// Produced by the matcher, before enrichment. `interval_minutes` is only
/// present when a mother exists and the elapsed time falls inside the valid
/// bound; an out-of-bound interval drops the interval but keeps the mother
/// link as informational.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedTransfer {
    /// The transfer event being resolved
    pub transfer: Event,

    /// The prior event that authorized the discount, when one was found
    pub mother: Option<Event>,

    /// Elapsed minutes from mother to transfer, in [0, 120]
    pub interval_minutes: Option<f64>,
}

/// Discount percentage band relative to the full reference fare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountRate {
    /// Saved at least 95% of the reference fare
    Full,

    /// Saved at least 45% of the reference fare
    Half,

    /// Anything below the 45% band
    Other,
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiscountRate::Full => "100%",
            DiscountRate::Half => "50%",
            DiscountRate::Other => "other",
        };
        write!(f, "{}", label)
    }
}

/// Discount-tier classification of a transfer event
///
/// A classified tier combines the program, the trip index within the
/// program (Program A distinguishes two trips, Program B has none), the
/// transfer index within the trip, and the percentage band. A
/// `(program, transfer_code)` pair outside the fixed tier table is
/// `Anomalous`; the record is still emitted, only its label marks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountTier {
    Classified {
        program: FareProgram,
        /// Trip index within the program, if the program distinguishes trips
        trip: Option<u8>,
        /// Transfer index within the trip (1 = first transfer, 2 = second)
        transfer: u8,
        rate: DiscountRate,
    },
    Anomalous,
}

impl fmt::Display for DiscountTier {
    /// Render the closed label set, e.g. `program-a/trip1/transfer1/100%`,
    /// `program-b/transfer2/50%` or `anomalous`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountTier::Classified {
                program,
                trip,
                transfer,
                rate,
            } => {
                write!(f, "{}", program.label())?;
                if let Some(trip) = trip {
                    write!(f, "/trip{}", trip)?;
                }
                write!(f, "/transfer{}/{}", transfer, rate)
            }
            DiscountTier::Anomalous => write!(f, "anomalous"),
        }
    }
}

/// Operator relationship between the transfer boarding and its mother
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    /// No mother was linked, or the mother's route has no catalog operator
    NoMother,

    /// Both operators resolved and are the same company
    SameOperator,

    /// Both events resolved against the catalog to different companies,
    /// or only the mother's operator resolved
    CrossOperator,
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Relationship::NoMother => "no-mother",
            Relationship::SameOperator => "same-operator",
            Relationship::CrossOperator => "cross-operator",
        };
        write!(f, "{}", label)
    }
}

/// Persistence-ready linked-transfer record
///
/// One per qualifying transfer event. Created by the enricher and numbered
/// by the engine after all chunks complete; `link_id` is the only field
/// assigned outside the enricher.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedTransfer {
    /// Correlative identifier, unique and monotonic across the installation
    ///
    /// Assigned after collection by sorting on `(card_id, transfer.sequence)`
    /// and numbering from the last persisted id, so the value is independent
    /// of chunking and worker scheduling.
    pub link_id: LinkId,

    /// The original transfer event
    pub transfer: Event,

    /// The matched mother event, absent when no valid candidate existed
    pub mother: Option<Event>,

    /// Minutes elapsed from mother to transfer, in [0, 120]
    pub interval_minutes: Option<f64>,

    /// 1 for a first transfer, 2 for a second transfer within the journey
    pub transfer_ordinal: u8,

    /// Monetary benefit of the discounted boarding; never negative
    pub saved_amount: Decimal,

    /// Tier label for the applied discount policy
    pub discount_tier: DiscountTier,

    /// Operator of the mother's route, when the catalog resolves it
    pub origin_operator: Option<String>,

    /// Operator of the transfer's route, when the catalog resolves it
    pub destination_operator: Option<String>,

    /// Operator relationship classification
    pub relationship: Relationship,
}
