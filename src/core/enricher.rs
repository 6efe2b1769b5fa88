//! Record enrichment
//!
//! Turns matcher output into persistence-ready records: monetary savings
//! against the full reference fare, percentage banding, discount-tier
//! classification, operator resolution for both routes and the operator
//! relationship. Every computation is a pure function of the record and
//! the frozen batch state, so per-record and bulk evaluation are
//! interchangeable by construction.
//!
//! `link_id` is NOT assigned here; numbering happens once, after all
//! chunks are collected, so it cannot depend on worker scheduling.

use rust_decimal::Decimal;

use crate::core::catalog::RouteCatalog;
use crate::core::rules::LinkRules;
use crate::types::{DiscountTier, LinkedTransfer, MatchedTransfer, Relationship};

/// Per-batch enricher over the frozen catalog and rule set
pub struct Enricher<'a> {
    catalog: &'a RouteCatalog,
    rules: &'a LinkRules,
}

impl<'a> Enricher<'a> {
    /// Create an enricher borrowing the batch's shared read-only state
    pub fn new(catalog: &'a RouteCatalog, rules: &'a LinkRules) -> Self {
        Enricher { catalog, rules }
    }

    /// Enrich a single matched transfer into an output record
    pub fn enrich(&self, matched: MatchedTransfer) -> LinkedTransfer {
        let MatchedTransfer {
            transfer,
            mother,
            interval_minutes,
        } = matched;

        let reference_fare = self.rules.reference_fare(transfer.transport_class);
        let saved_amount = (reference_fare - transfer.amount).max(Decimal::ZERO);
        let rate = self.rules.discount_rate(saved_amount, reference_fare);

        let discount_tier = match self
            .rules
            .tier_shape(transfer.program, transfer.transfer_code)
        {
            Some(shape) => DiscountTier::Classified {
                program: transfer.program,
                trip: shape.trip,
                transfer: shape.transfer,
                rate,
            },
            None => DiscountTier::Anomalous,
        };

        let destination_operator = self
            .catalog
            .operator(&transfer.route_id)
            .map(str::to_string);
        let origin_operator = mother
            .as_ref()
            .and_then(|mother| self.catalog.operator(&mother.route_id))
            .map(str::to_string);

        let relationship = match (&origin_operator, &destination_operator) {
            (None, _) => Relationship::NoMother,
            (Some(origin), Some(destination)) if origin == destination => {
                Relationship::SameOperator
            }
            _ => Relationship::CrossOperator,
        };

        LinkedTransfer {
            link_id: 0,
            transfer_ordinal: self.rules.transfer_ordinal(transfer.transfer_code),
            transfer,
            mother,
            interval_minutes,
            saved_amount,
            discount_tier,
            origin_operator,
            destination_operator,
            relationship,
        }
    }

    /// Enrich a batch of matched transfers
    ///
    /// Equivalent to mapping [`Enricher::enrich`] over the input; exists so
    /// chunk workers have a single bulk entry point.
    pub fn enrich_all(&self, matched: Vec<MatchedTransfer>) -> Vec<LinkedTransfer> {
        matched.into_iter().map(|m| self.enrich(m)).collect()
    }
}
