//! Sequential processing strategy
//!
//! Single-threaded implementation of the `ProcessingStrategy` trait. It
//! orchestrates one batch by coordinating the file-backed event source,
//! the route-catalog reader, the linking engine's single-chunk path and
//! the CSV output writer. Its output is the reference the parallel
//! strategy must reproduce byte for byte.

use std::io::Write;

use crate::core::{BatchInput, BatchSummary, EventSource, LinkEngine, LinkRules};
use crate::io::csv_format::write_linked_csv;
use crate::io::sync_reader::{read_routes, CsvEventSource};
use crate::strategy::{BatchPaths, ProcessingStrategy};
use crate::types::LinkError;

/// Sequential processing strategy
///
/// Matching runs on the calling thread as a single chunk; useful for
/// small windows, debugging and as the determinism reference in tests.
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        inputs: &BatchPaths,
        output: &mut dyn Write,
    ) -> Result<BatchSummary, LinkError> {
        let rules = LinkRules::new();

        let mut source = CsvEventSource::new(
            inputs.transfers.clone(),
            inputs.history.clone(),
            rules.clone(),
        );

        let input = BatchInput {
            transfers: source.transfer_events()?,
            history: source.history_events()?,
            routes: read_routes(&inputs.routes)?,
            last_link_id: inputs.last_link_id,
        };

        let engine = LinkEngine::with_rules(rules);
        let batch = engine.run(input)?;

        write_linked_csv(&batch.records, output)?;

        Ok(batch.summary)
    }
}
