//! Farebox event types for the transfer linking engine
//!
//! This module defines the immutable input event sourced from the farebox
//! system, together with the identifier aliases and the two closed
//! enumerations (fare program, transport class) that drive the linking and
//! classification rules.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment card identifier
///
/// Opaque serial of the payment medium; events are grouped and matched
/// per card.
pub type CardId = u64;

/// Per-card event sequence number
///
/// Strictly increasing within a card's session and therefore unique per
/// card. It is the ordering key for "before/after", used instead of the
/// wall clock so ordering is tie-free.
pub type Sequence = i64;

/// Transfer-code tag
///
/// Small integer describing the role of the event within its program's
/// transfer sequence (first boarding, first transfer, second transfer, ...).
/// The meaning of each value is owned by the rule tables, not by this type.
pub type TransferCode = u8;

/// Correlative identifier of a persisted linked-transfer record
///
/// Strictly increasing across all records ever persisted for the
/// installation; never reused or reordered once assigned.
pub type LinkId = i64;

/// Fare-integration program an event belongs to
///
/// Two programs participate in the discount scheme, each with its own
/// transfer codes and matching rules. The wire codes are the entity
/// identifiers emitted by the farebox system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FareProgram {
    /// Entity `0002`: two-trip program, transfer codes 1/5/6/9/10
    ProgramA,

    /// Entity `0003`: single base-boarding program, transfer codes 1/2
    ProgramB,
}

impl FareProgram {
    /// Parse the entity wire code emitted by the farebox system
    pub fn from_wire(code: &str) -> Option<Self> {
        match code {
            "0002" => Some(FareProgram::ProgramA),
            "0003" => Some(FareProgram::ProgramB),
            _ => None,
        }
    }

    /// Entity wire code for this program
    pub fn wire_code(&self) -> &'static str {
        match self {
            FareProgram::ProgramA => "0002",
            FareProgram::ProgramB => "0003",
        }
    }

    /// Lowercase label used in tier strings and output records
    pub fn label(&self) -> &'static str {
        match self {
            FareProgram::ProgramA => "program-a",
            FareProgram::ProgramB => "program-b",
        }
    }
}

/// Fare class of the vehicle the event occurred on
///
/// The class determines the full-fare reference amount a discounted
/// boarding is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportClass {
    /// Wire code `1`, flat reference fare 2400
    Conventional,

    /// Wire code `3`, flat reference fare 3400
    Differential,
}

impl TransportClass {
    /// Parse the transport-class wire code
    pub fn from_wire(code: &str) -> Option<Self> {
        match code {
            "1" => Some(TransportClass::Conventional),
            "3" => Some(TransportClass::Differential),
            _ => None,
        }
    }

    /// Transport-class wire code
    pub fn wire_code(&self) -> &'static str {
        match self {
            TransportClass::Conventional => "1",
            TransportClass::Differential => "3",
        }
    }
}

/// Geographic coordinate pair attached to an event, when the vehicle
/// reported a fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single farebox validation event
///
/// Immutable for the lifetime of a batch run. Both the transfer feed and
/// the history feed use this shape; the feeds differ only in how they were
/// filtered upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Serial of the payment medium
    pub card_id: CardId,

    /// Strictly increasing per-card ordering key
    pub sequence: Sequence,

    /// Wall-clock time of the validation
    pub timestamp: NaiveDateTime,

    /// Fare program the event was validated under
    pub program: FareProgram,

    /// Role of the event within its program's transfer sequence
    pub transfer_code: TransferCode,

    /// Route (or station) the validation happened at
    pub route_id: String,

    /// Money paid at this event; never negative
    pub amount: Decimal,

    /// Reported vehicle position, if any
    pub location: Option<GeoPoint>,

    /// Fare class, drives the full-fare reference amount
    pub transport_class: TransportClass,
}
