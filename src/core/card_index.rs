//! Per-card history index
//!
//! Groups the history feed by card identifier into buckets ordered by
//! sequence number. Built once per batch in a single pass, immutable
//! afterwards, and therefore safe to share read-only across chunk workers.
//!
//! Lookups never fail: an unknown card yields an empty slice. The
//! strict-predecessor lookup used by the matcher is a `partition_point`
//! over the ordered bucket, which structurally excludes the transfer's own
//! sequence number from the candidate range (self-matching is forbidden).

use std::collections::HashMap;

use crate::types::{CardId, Event, Sequence};

/// Ordered per-card buckets of history events
#[derive(Debug)]
pub struct CardIndex {
    buckets: HashMap<CardId, Vec<Event>>,
}

impl CardIndex {
    /// Build the index from the history feed
    ///
    /// Events are grouped by card and each bucket is sorted by sequence
    /// ascending. Input order is irrelevant.
    pub fn build(history: Vec<Event>) -> Self {
        let mut buckets: HashMap<CardId, Vec<Event>> = HashMap::new();

        for event in history {
            buckets.entry(event.card_id).or_default().push(event);
        }

        for bucket in buckets.values_mut() {
            bucket.sort_by_key(|event| event.sequence);
        }

        CardIndex { buckets }
    }

    /// Full ordered history of a card; empty for unknown cards
    pub fn history(&self, card_id: CardId) -> &[Event] {
        self.buckets
            .get(&card_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Strict predecessors of `sequence` within a card's history
    ///
    /// Returns the ordered prefix of events whose sequence is strictly
    /// below the cutoff, so an event can never be offered as its own
    /// mother candidate.
    pub fn candidates_before(&self, card_id: CardId, sequence: Sequence) -> &[Event] {
        let bucket = self.history(card_id);
        let end = bucket.partition_point(|event| event.sequence < sequence);
        &bucket[..end]
    }

    /// Number of distinct cards in the index
    pub fn card_count(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of indexed history events
    pub fn event_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
