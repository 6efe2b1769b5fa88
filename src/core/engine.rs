//! Batch orchestration
//!
//! `LinkEngine` drives one processing window end to end: input sanity
//! checks, catalog and index construction, matching and enrichment
//! (sequentially or across chunk workers), and the deterministic
//! correlative-id assignment. The engine holds no state between runs
//! except the rule set; the last assigned id comes in with each batch.

use std::sync::Arc;

use log::{info, warn};

use crate::core::card_index::CardIndex;
use crate::core::catalog::RouteCatalog;
use crate::core::dispatcher::{assign_link_ids, dispatch, process_chunk, LinkContext};
use crate::core::rules::LinkRules;
use crate::core::traits::Extraction;
use crate::types::{Event, LinkError, LinkId, LinkedTransfer};

/// Everything a batch run consumes
#[derive(Debug)]
pub struct BatchInput {
    /// Transfer feed with its reject count
    pub transfers: Extraction,

    /// History feed with its reject count
    pub history: Extraction,

    /// `(route_id, operator)` catalog entries
    pub routes: Vec<(String, String)>,

    /// Highest correlative id already persisted by the sink
    pub last_link_id: LinkId,
}

/// Counters describing a finished batch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Transfer events processed
    pub transfers: usize,

    /// Records with a linked mother
    pub linked: usize,

    /// Records without a mother
    pub unmatched: usize,

    /// Malformed rows excluded across both input feeds
    pub rejected_rows: u64,

    /// Distinct cards in the history index
    pub cards: usize,

    /// History events indexed
    pub history_events: usize,
}

/// Output of a batch run
#[derive(Debug)]
pub struct BatchOutput {
    /// Enriched records with final correlative ids
    pub records: Vec<LinkedTransfer>,

    /// Batch counters
    pub summary: BatchSummary,
}

/// Mother-validation linking engine
///
/// Construct once with a frozen rule set and reuse across batch runs;
/// nothing inside mutates after construction.
#[derive(Debug, Default)]
pub struct LinkEngine {
    rules: LinkRules,
}

impl LinkEngine {
    /// Engine with the standard fare-policy rules
    pub fn new() -> Self {
        LinkEngine {
            rules: LinkRules::new(),
        }
    }

    /// Engine with a custom rule set (tests, policy experiments)
    pub fn with_rules(rules: LinkRules) -> Self {
        LinkEngine { rules }
    }

    /// Run the batch on the calling thread, as a single chunk
    ///
    /// # Errors
    ///
    /// Fails fatally on an excessive reject rate in either input feed or
    /// on an empty route catalog. "No mother found" never fails.
    pub fn run(&self, input: BatchInput) -> Result<BatchOutput, LinkError> {
        let (context, transfers, rejected_rows, last_link_id) = self.prepare(input)?;

        let mut records = process_chunk(&context, &transfers);
        assign_link_ids(&mut records, last_link_id);

        Ok(self.finish(&context, records, rejected_rows))
    }

    /// Run the batch across `workers` concurrent chunk tasks
    ///
    /// Produces byte-identical output to [`LinkEngine::run`] for the same
    /// input, regardless of worker count or scheduling.
    ///
    /// # Errors
    ///
    /// Same fatal conditions as [`LinkEngine::run`], plus
    /// [`LinkError::WorkerPanic`] when a chunk worker fails; the batch
    /// aborts with no partial output.
    pub async fn run_parallel(
        &self,
        input: BatchInput,
        workers: usize,
    ) -> Result<BatchOutput, LinkError> {
        let (context, transfers, rejected_rows, last_link_id) = self.prepare(input)?;

        let context = Arc::new(context);
        let mut records = dispatch(Arc::clone(&context), transfers, workers).await?;
        assign_link_ids(&mut records, last_link_id);

        Ok(self.finish(&context, records, rejected_rows))
    }

    /// Validate inputs and freeze the shared batch state
    fn prepare(
        &self,
        input: BatchInput,
    ) -> Result<(LinkContext, Vec<Event>, u64, LinkId), LinkError> {
        let BatchInput {
            transfers,
            history,
            routes,
            last_link_id,
        } = input;

        self.rules
            .check_reject_rate(transfers.rejected, transfers.total_rows())?;
        self.rules
            .check_reject_rate(history.rejected, history.total_rows())?;

        let rejected_rows = transfers.rejected + history.rejected;
        if rejected_rows > 0 {
            warn!("excluded {} malformed input rows", rejected_rows);
        }

        let catalog = RouteCatalog::from_entries(routes);
        if catalog.is_empty() {
            return Err(LinkError::EmptyRouteCatalog);
        }

        let index = CardIndex::build(history.events);
        info!(
            "indexed {} history events across {} cards for {} transfers",
            index.event_count(),
            index.card_count(),
            transfers.events.len()
        );

        let context = LinkContext {
            index,
            catalog,
            rules: self.rules.clone(),
        };

        Ok((context, transfers.events, rejected_rows, last_link_id))
    }

    /// Build the summary once records are collected and numbered
    fn finish(
        &self,
        context: &LinkContext,
        records: Vec<LinkedTransfer>,
        rejected_rows: u64,
    ) -> BatchOutput {
        let linked = records.iter().filter(|r| r.mother.is_some()).count();
        let summary = BatchSummary {
            transfers: records.len(),
            linked,
            unmatched: records.len() - linked,
            rejected_rows,
            cards: context.index.card_count(),
            history_events: context.index.event_count(),
        };

        info!(
            "batch complete: {} records, {} linked, {} unmatched",
            summary.transfers, summary.linked, summary.unmatched
        );

        BatchOutput { records, summary }
    }
}
