//! Transfer Linker Library
//! # Overview
//!
//! This library links "transfer" fare validations (a rider boarding a
//! second vehicle under a discount policy) to the single "mother"
//! validation that authorized the discount, for a public-transit
//! fare-integration program. It operates on finite daily batches: given a
//! card's transfer events and its event history over a lookback window, it
//! deterministically selects the prior event that authorized each
//! transfer (or determines none exists), computes the elapsed interval,
//! classifies the discount tier, and emits an enriched record.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Event, LinkedTransfer, etc.)
//! - [`cli`] - CLI argument parsing
//! - [`core`] - Business logic components:
//!   - [`core::rules`] - Frozen fare-policy rule tables
//!   - [`core::card_index`] - Per-card ordered history buckets
//!   - [`core::matcher`] - Mother-validation selection
//!   - [`core::enricher`] - Savings, tier and relationship computation
//!   - [`core::dispatcher`] - Chunked parallel execution
//!   - [`core::engine`] - Batch orchestration
//! - [`io`] - CSV feed reading and output writing
//! - [`strategy`] - Pluggable sequential / parallel pipelines
//!
//! # Determinism
//!
//! For a given input window the output record set and every correlative
//! `link_id` are identical whether the batch runs as one chunk or across
//! many workers: ids are assigned after collection over a stable
//! `(card_id, sequence)` sort.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use self::core::{
    BatchInput, BatchOutput, BatchSummary, CardIndex, Enricher, LinkEngine, LinkRules, Matcher,
    RouteCatalog,
};
pub use io::write_linked_csv;
pub use types::{
    CardId, DiscountRate, DiscountTier, Event, FareProgram, LinkError, LinkId, LinkedTransfer,
    MatchedTransfer, Relationship, Sequence, TransferCode, TransportClass,
};
