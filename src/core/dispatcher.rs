//! Parallel chunk dispatcher
//!
//! Splits the transfer feed into contiguous, non-overlapping chunks of
//! roughly equal size and runs the match + enrich pipeline on each chunk
//! in its own tokio task. The card index, route catalog and rules travel
//! to every worker behind one `Arc` as an immutable view; workers share
//! nothing mutable and never talk to each other.
//!
//! Collection is a join barrier: every chunk must complete before any
//! result is used. A panicked worker fails the whole batch; a silently
//! dropped chunk would be worse than no output.
//!
//! Correlative ids are assigned after the barrier by a single task:
//! records are sorted on `(card_id, transfer.sequence)` and numbered from
//! the last persisted id, so the assignment cannot observe chunk
//! boundaries or completion order.

use std::sync::Arc;

use log::debug;

use crate::core::card_index::CardIndex;
use crate::core::catalog::RouteCatalog;
use crate::core::enricher::Enricher;
use crate::core::matcher::Matcher;
use crate::core::rules::LinkRules;
use crate::types::{Event, LinkError, LinkId, LinkedTransfer};

/// Immutable shared state handed to every chunk worker
#[derive(Debug)]
pub struct LinkContext {
    /// Per-card ordered history buckets
    pub index: CardIndex,

    /// Route → operator catalog
    pub catalog: RouteCatalog,

    /// Frozen fare-policy rules
    pub rules: LinkRules,
}

/// Run the match + enrich pipeline over one chunk of transfer events
///
/// Pure with respect to the shared context; the sequential engine path and
/// every parallel worker go through this same function.
pub fn process_chunk(context: &LinkContext, chunk: &[Event]) -> Vec<LinkedTransfer> {
    let matcher = Matcher::new(&context.index, &context.rules);
    let enricher = Enricher::new(&context.catalog, &context.rules);

    chunk
        .iter()
        .map(|transfer| enricher.enrich(matcher.link(transfer)))
        .collect()
}

/// Process the whole transfer feed across `workers` concurrent chunk tasks
///
/// Output order carries no meaning; callers must treat the result as a set
/// until [`assign_link_ids`] gives it a deterministic numbering.
///
/// # Errors
///
/// Returns [`LinkError::WorkerPanic`] if any chunk task panics or is
/// cancelled; no partial result is returned in that case.
pub async fn dispatch(
    context: Arc<LinkContext>,
    transfers: Vec<Event>,
    workers: usize,
) -> Result<Vec<LinkedTransfer>, LinkError> {
    let total = transfers.len();
    let workers = workers.max(1);
    let chunk_size = total.div_ceil(workers).max(1);

    let mut tasks = Vec::with_capacity(workers);
    for (chunk_no, chunk) in transfers.chunks(chunk_size).enumerate() {
        let context = Arc::clone(&context);
        let chunk = chunk.to_vec();
        debug!("spawning chunk worker {} ({} events)", chunk_no, chunk.len());
        tasks.push(tokio::spawn(async move { process_chunk(&context, &chunk) }));
    }

    let mut results = Vec::with_capacity(total);
    for task in tasks {
        match task.await {
            Ok(chunk_results) => results.extend(chunk_results),
            Err(join_error) => return Err(LinkError::worker_panic(join_error.to_string())),
        }
    }

    Ok(results)
}

/// Assign correlative ids over the collected batch
///
/// Sorts on the stable key `(card_id, transfer.sequence)`, unique because
/// sequences are unique per card, and numbers sequentially from
/// `last_link_id + 1`. The result is identical for any chunking of the
/// same input.
pub fn assign_link_ids(records: &mut Vec<LinkedTransfer>, last_link_id: LinkId) {
    records.sort_unstable_by_key(|record| (record.transfer.card_id, record.transfer.sequence));

    for (offset, record) in records.iter_mut().enumerate() {
        record.link_id = last_link_id + 1 + offset as LinkId;
    }
}
