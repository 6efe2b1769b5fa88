//! Core business logic module
//!
//! This module contains the linking engine components:
//! - `rules` - Frozen fare-policy rule tables and bounds
//! - `card_index` - Per-card ordered history buckets
//! - `matcher` - Mother-validation selection for one transfer
//! - `catalog` - Route → operator lookup
//! - `enricher` - Savings, tier and relationship computation
//! - `dispatcher` - Chunked parallel execution and link-id assignment
//! - `engine` - Batch orchestration
//! - `traits` - Collaborator seams (event source, link sink)

pub mod card_index;
pub mod catalog;
pub mod dispatcher;
pub mod engine;
pub mod enricher;
pub mod matcher;
pub mod rules;
pub mod traits;

pub use card_index::CardIndex;
pub use catalog::RouteCatalog;
pub use dispatcher::{assign_link_ids, dispatch, process_chunk, LinkContext};
pub use engine::{BatchInput, BatchOutput, BatchSummary, LinkEngine};
pub use enricher::Enricher;
pub use matcher::Matcher;
pub use rules::{LinkRules, TierShape};
pub use traits::{EventSource, Extraction, LinkSink};
