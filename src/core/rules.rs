//! Frozen business rules for a linking batch
//!
//! All fare-policy constants live here: the mother-target-code table, the
//! discount-tier table, reference fares, the sequence-gap and interval
//! bounds, and the reject-rate ceiling. The rules are externally supplied
//! constants; nothing in this module is learned from data.
//!
//! A `LinkRules` value is constructed once per batch and passed by
//! reference into the matcher and enricher. It is never mutated after
//! construction, so it can be shared across chunk workers without locking.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::types::{DiscountRate, FareProgram, LinkError, TransferCode, TransportClass};

/// Trip/transfer position a classified tier maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierShape {
    /// Trip index within the program, when the program distinguishes trips
    pub trip: Option<u8>,
    /// Transfer index within the trip (1 or 2)
    pub transfer: u8,
}

/// Frozen rule set for one batch run
///
/// Keyed lookup tables replace conditional chains so every
/// `(program, transfer_code)` combination is auditable in one place, with
/// absence from a table as the explicit "unmapped" sentinel.
#[derive(Debug, Clone)]
pub struct LinkRules {
    /// Largest allowed `transfer.sequence - mother.sequence`
    pub max_sequence_gap: i64,

    /// Largest valid mother-to-transfer interval, in minutes
    pub max_interval_minutes: f64,

    /// Share of the reference fare that must be saved for the 100% band
    pub full_rate_threshold: Decimal,

    /// Share of the reference fare that must be saved for the 50% band
    pub half_rate_threshold: Decimal,

    /// Largest tolerated share of malformed input rows before the batch fails
    pub max_reject_rate: f64,

    conventional_fare: Decimal,
    differential_fare: Decimal,
    mother_targets: HashMap<(FareProgram, TransferCode), TransferCode>,
    tier_table: HashMap<(FareProgram, TransferCode), TierShape>,
    qualifying: HashSet<(FareProgram, TransferCode)>,
}

impl LinkRules {
    /// Build the fixed fare-policy rule set
    pub fn new() -> Self {
        let mut mother_targets = HashMap::new();
        // Program A: the first transfer of a trip points back at the trip's
        // paid boarding (code 4 for trip 1, code 8 for trip 2). Code 1 has
        // no defined target.
        mother_targets.insert((FareProgram::ProgramA, 5), 4);
        mother_targets.insert((FareProgram::ProgramA, 6), 4);
        mother_targets.insert((FareProgram::ProgramA, 9), 8);
        mother_targets.insert((FareProgram::ProgramA, 10), 8);
        // Program B: every transfer points back at the base boarding.
        mother_targets.insert((FareProgram::ProgramB, 1), 0);
        mother_targets.insert((FareProgram::ProgramB, 2), 0);

        let mut tier_table = HashMap::new();
        tier_table.insert(
            (FareProgram::ProgramA, 5),
            TierShape {
                trip: Some(1),
                transfer: 1,
            },
        );
        tier_table.insert(
            (FareProgram::ProgramA, 6),
            TierShape {
                trip: Some(1),
                transfer: 2,
            },
        );
        tier_table.insert(
            (FareProgram::ProgramA, 9),
            TierShape {
                trip: Some(2),
                transfer: 1,
            },
        );
        tier_table.insert(
            (FareProgram::ProgramA, 10),
            TierShape {
                trip: Some(2),
                transfer: 2,
            },
        );
        tier_table.insert(
            (FareProgram::ProgramB, 1),
            TierShape {
                trip: None,
                transfer: 1,
            },
        );
        tier_table.insert(
            (FareProgram::ProgramB, 2),
            TierShape {
                trip: None,
                transfer: 2,
            },
        );

        let qualifying: HashSet<(FareProgram, TransferCode)> = [
            (FareProgram::ProgramA, 1),
            (FareProgram::ProgramA, 5),
            (FareProgram::ProgramA, 6),
            (FareProgram::ProgramA, 9),
            (FareProgram::ProgramA, 10),
            (FareProgram::ProgramB, 1),
            (FareProgram::ProgramB, 2),
        ]
        .into_iter()
        .collect();

        LinkRules {
            max_sequence_gap: 10,
            max_interval_minutes: 120.0,
            full_rate_threshold: Decimal::new(95, 2),
            half_rate_threshold: Decimal::new(45, 2),
            max_reject_rate: 0.25,
            conventional_fare: Decimal::from(2400),
            differential_fare: Decimal::from(3400),
            mother_targets,
            tier_table,
            qualifying,
        }
    }

    /// Required transfer code of the mother for a given transfer event
    ///
    /// `None` means no code filter applies to the candidate search.
    pub fn mother_target_code(
        &self,
        program: FareProgram,
        transfer_code: TransferCode,
    ) -> Option<TransferCode> {
        self.mother_targets.get(&(program, transfer_code)).copied()
    }

    /// Tier-table entry for a `(program, transfer_code)` pair
    ///
    /// `None` marks the pair as anomalous.
    pub fn tier_shape(
        &self,
        program: FareProgram,
        transfer_code: TransferCode,
    ) -> Option<TierShape> {
        self.tier_table.get(&(program, transfer_code)).copied()
    }

    /// Whether a `(program, transfer_code)` pair is a qualifying transfer
    ///
    /// The transfer feed is expected pre-filtered to these combinations;
    /// the file adapter applies the same filter defensively.
    pub fn is_qualifying_transfer(
        &self,
        program: FareProgram,
        transfer_code: TransferCode,
    ) -> bool {
        self.qualifying.contains(&(program, transfer_code))
    }

    /// Full-fare reference amount for a transport class
    pub fn reference_fare(&self, transport_class: TransportClass) -> Decimal {
        match transport_class {
            TransportClass::Conventional => self.conventional_fare,
            TransportClass::Differential => self.differential_fare,
        }
    }

    /// Transfer ordinal within the journey: 2 for second-transfer codes,
    /// 1 otherwise.
    pub fn transfer_ordinal(&self, transfer_code: TransferCode) -> u8 {
        match transfer_code {
            2 | 6 | 10 => 2,
            _ => 1,
        }
    }

    /// Percentage band for a saved amount against a reference fare
    pub fn discount_rate(&self, saved: Decimal, reference_fare: Decimal) -> DiscountRate {
        if saved >= reference_fare * self.full_rate_threshold {
            DiscountRate::Full
        } else if saved >= reference_fare * self.half_rate_threshold {
            DiscountRate::Half
        } else {
            DiscountRate::Other
        }
    }

    /// Fail the batch when the malformed-row share exceeds the ceiling
    ///
    /// `total` is rows read, `rejected` the rows excluded as malformed.
    /// An empty input is fine (there is nothing to be wrong about).
    pub fn check_reject_rate(&self, rejected: u64, total: u64) -> Result<(), LinkError> {
        if total == 0 {
            return Ok(());
        }
        let rate = rejected as f64 / total as f64;
        if rate > self.max_reject_rate {
            return Err(LinkError::ExcessiveRejects {
                rejected,
                total,
                max_rate: self.max_reject_rate,
            });
        }
        Ok(())
    }
}

impl Default for LinkRules {
    fn default() -> Self {
        Self::new()
    }
}
