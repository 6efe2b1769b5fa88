//! Collaborator seams for the linking engine
//!
//! The engine itself never touches a store or a file: it receives finite
//! event collections scoped to one processing window and hands back
//! enriched records. These traits are the contract with the surrounding
//! adapters so file-backed, store-backed and in-memory implementations
//! are interchangeable.

use crate::types::{Event, LinkError, LinkId, LinkedTransfer};

/// Result of pulling one input feed from an event source
///
/// `events` are the rows that survived input-shape validation; `rejected`
/// counts the rows excluded as malformed. The engine uses the pair to
/// enforce the reject-rate ceiling.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Accepted events
    pub events: Vec<Event>,

    /// Rows excluded as malformed
    pub rejected: u64,
}

impl Extraction {
    /// Total rows read, accepted plus rejected
    pub fn total_rows(&self) -> u64 {
        self.events.len() as u64 + self.rejected
    }
}

/// Supplier of the two input feeds for a processing window
///
/// The transfer feed is expected pre-filtered to qualifying
/// `(program, transfer_code)` combinations; the history feed spans the
/// extended lookback window and covers exactly the cards present in the
/// transfer feed (a superset of cards is tolerated, extra buckets are
/// simply never looked up).
pub trait EventSource {
    /// Candidate transfers to resolve
    fn transfer_events(&mut self) -> Result<Extraction, LinkError>;

    /// Candidate mother events for the cards in the transfer feed
    fn history_events(&mut self) -> Result<Extraction, LinkError>;
}

/// Consumer of the finished batch
///
/// The sink owns full-replace semantics for the processing window: prior
/// records for the window disappear and the new set lands as a single
/// all-or-nothing unit. It also supplies the last assigned correlative id
/// before each run.
pub trait LinkSink {
    /// Highest link id ever persisted, 0 when none
    fn last_link_id(&mut self) -> Result<LinkId, LinkError>;

    /// Replace the window's records with `records`, atomically
    fn replace_batch(&mut self, records: &[LinkedTransfer]) -> Result<(), LinkError>;
}
