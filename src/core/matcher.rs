//! Mother-validation matcher
//!
//! For a single transfer event, selects the prior event on the same card
//! that authorized the discount, if one exists. The search is a backward
//! scan over the card's ordered history bucket:
//!
//! 1. candidates are the strict sequence-predecessors of the transfer;
//! 2. the rule table may demand a target transfer code for the mother;
//!    when at least one candidate carries it the set narrows to those,
//!    otherwise the full set is kept (a transfer is never left unmatched
//!    solely because the preferred code is absent);
//! 3. the nearest-preceding candidate (greatest sequence) wins; sequences
//!    are unique per card, so ties cannot occur;
//! 4. a hard sequence-gap bound then discards picks from unrelated trips;
//! 5. the elapsed interval is kept only inside [0, max] minutes; an
//!    out-of-bound interval is dropped while the mother link stays as
//!    informational.
//!
//! "No mother" is an expected outcome, not an error.

use crate::core::card_index::CardIndex;
use crate::core::rules::LinkRules;
use crate::types::{Event, MatchedTransfer};

/// Per-batch matcher over a frozen index and rule set
pub struct Matcher<'a> {
    index: &'a CardIndex,
    rules: &'a LinkRules,
}

impl<'a> Matcher<'a> {
    /// Create a matcher borrowing the batch's shared read-only state
    pub fn new(index: &'a CardIndex, rules: &'a LinkRules) -> Self {
        Matcher { index, rules }
    }

    /// Resolve one transfer event against its card's history
    pub fn link(&self, transfer: &Event) -> MatchedTransfer {
        let candidates = self
            .index
            .candidates_before(transfer.card_id, transfer.sequence);

        let mother = self.select_mother(transfer, candidates).cloned();

        let interval_minutes = mother
            .as_ref()
            .and_then(|mother| self.valid_interval(mother, transfer));

        MatchedTransfer {
            transfer: transfer.clone(),
            mother,
            interval_minutes,
        }
    }

    /// Pick the mother among the ordered candidate prefix
    fn select_mother(&self, transfer: &Event, candidates: &'a [Event]) -> Option<&'a Event> {
        if candidates.is_empty() {
            return None;
        }

        let target = self
            .rules
            .mother_target_code(transfer.program, transfer.transfer_code);

        // Candidates are sorted ascending, so the reverse scan finds the
        // greatest sequence carrying the target code. Falls back to the
        // nearest predecessor when no candidate carries it.
        let pick = match target {
            Some(code) => candidates
                .iter()
                .rev()
                .find(|event| event.transfer_code == code)
                .or_else(|| candidates.last()),
            None => candidates.last(),
        }?;

        // Gap bound applies to the selected candidate independently of the
        // code filter; sparse numbering across unrelated trips must not link.
        if transfer.sequence - pick.sequence > self.rules.max_sequence_gap {
            return None;
        }

        Some(pick)
    }

    /// Elapsed minutes from mother to transfer, when inside the valid bound
    fn valid_interval(&self, mother: &Event, transfer: &Event) -> Option<f64> {
        let minutes = (transfer.timestamp - mother.timestamp).num_seconds() as f64 / 60.0;
        (minutes >= 0.0 && minutes <= self.rules.max_interval_minutes).then_some(minutes)
    }
}
