//! Processing strategy module for batch linking runs
//!
//! This module defines the Strategy pattern for complete linking pipelines,
//! encompassing feed reading, engine execution and output writing. This
//! allows different processing implementations (sequential, parallel
//! chunked) to be selected at runtime; both produce identical output for
//! identical input.

use std::io::Write;
use std::path::PathBuf;

use crate::cli::StrategyType;
use crate::core::BatchSummary;
use crate::types::{LinkError, LinkId};

pub mod parallel;
pub mod sync;

pub use parallel::{ParallelProcessingStrategy, WorkerConfig};
pub use sync::SyncProcessingStrategy;

/// File locations and sink state for one batch run
#[derive(Debug, Clone)]
pub struct BatchPaths {
    /// Transfer feed CSV
    pub transfers: PathBuf,

    /// History feed CSV
    pub history: PathBuf,

    /// Route catalog CSV
    pub routes: PathBuf,

    /// Highest correlative id already persisted by the sink
    pub last_link_id: LinkId,
}

/// Processing strategy trait for complete linking pipelines
///
/// Each strategy reads the two event feeds and the route catalog, runs
/// the linking engine, and writes the linked-transfer records to the
/// provided output.
pub trait ProcessingStrategy: Send + Sync {
    /// Run one batch and write its records to `output`
    ///
    /// # Errors
    ///
    /// Fatal conditions only: missing input files, I/O failures, an empty
    /// route catalog, an excessive reject rate, or a failed chunk worker.
    /// Row-level rejects are counted in the returned summary instead.
    fn process(
        &self,
        inputs: &BatchPaths,
        output: &mut dyn Write,
    ) -> Result<BatchSummary, LinkError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// The worker configuration only applies to the parallel strategy and is
/// ignored by the sequential one.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<WorkerConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Parallel => {
            let config = config.unwrap_or_default();
            Box::new(ParallelProcessingStrategy::new(config))
        }
    }
}
