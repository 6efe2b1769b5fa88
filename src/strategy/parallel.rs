//! Parallel processing strategy
//!
//! Multi-threaded implementation of the `ProcessingStrategy` trait. Feeds
//! are read with the async batch reader, then the engine partitions the
//! transfer feed into contiguous chunks and links them across tokio
//! worker tasks. Output is byte-identical to the sequential strategy for
//! the same input: the correlative-id assignment happens after the join
//! barrier and is independent of chunking.

use std::io::Write;
use std::path::Path;

use log::warn;
use tokio_util::compat::TokioAsyncReadCompatExt;

use crate::core::{BatchInput, BatchSummary, Extraction, LinkEngine, LinkRules};
use crate::io::async_reader::AsyncEventReader;
use crate::io::csv_format::write_linked_csv;
use crate::io::sync_reader::read_routes;
use crate::strategy::{BatchPaths, ProcessingStrategy};
use crate::types::{Event, LinkError};

/// Rows pulled from a feed per reader cycle
const READ_BATCH_SIZE: usize = 1000;

/// Configuration for parallel batch processing
///
/// Controls the number of chunk workers, which also sizes the tokio
/// runtime's thread pool.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Number of concurrent chunk workers
    pub workers: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
        }
    }
}

impl WorkerConfig {
    /// Create a WorkerConfig with a custom worker count
    ///
    /// A zero worker count falls back to the default with a warning.
    pub fn new(workers: usize) -> Self {
        let default = Self::default();

        let workers = if workers == 0 {
            warn!(
                "invalid worker count (0), using default ({})",
                default.workers
            );
            default.workers
        } else {
            workers
        };

        Self { workers }
    }
}

/// Parallel processing strategy
///
/// Runs the linking engine's chunked path on a multi-threaded tokio
/// runtime. The card index, catalog and rules are frozen before any
/// worker starts; workers share them read-only and return their chunk's
/// records at the join barrier.
#[derive(Debug, Clone)]
pub struct ParallelProcessingStrategy {
    config: WorkerConfig,
}

impl ParallelProcessingStrategy {
    /// Create a new strategy with the specified worker configuration
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }
}

/// Drain one feed through the async reader, keeping rows `keep` accepts
///
/// Filtered rows (shape-valid but out of feed contract) are dropped
/// silently here; malformed rows are counted as rejects.
async fn read_feed<F>(path: &Path, keep: F) -> Result<Extraction, LinkError>
where
    F: Fn(&Event) -> bool,
{
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LinkError::file_not_found(path.display().to_string())
        } else {
            LinkError::from(e)
        }
    })?;

    let mut reader = AsyncEventReader::new(file.compat());
    let mut extraction = Extraction::default();

    loop {
        let batch = reader.read_batch(READ_BATCH_SIZE).await;
        if batch.events.is_empty() && batch.rejected == 0 {
            break;
        }
        extraction
            .events
            .extend(batch.events.into_iter().filter(&keep));
        extraction.rejected += batch.rejected;
    }

    Ok(extraction)
}

impl ProcessingStrategy for ParallelProcessingStrategy {
    fn process(
        &self,
        inputs: &BatchPaths,
        output: &mut dyn Write,
    ) -> Result<BatchSummary, LinkError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.workers)
            .enable_all()
            .build()
            .map_err(|e| LinkError::RuntimeError {
                message: e.to_string(),
            })?;

        runtime.block_on(async {
            let rules = LinkRules::new();

            let transfer_rules = rules.clone();
            let transfers = read_feed(&inputs.transfers, move |event| {
                transfer_rules.is_qualifying_transfer(event.program, event.transfer_code)
            })
            .await?;

            let history = read_feed(&inputs.history, |event| {
                event.amount > rust_decimal::Decimal::ZERO
            })
            .await?;

            let input = BatchInput {
                transfers,
                history,
                routes: read_routes(&inputs.routes)?,
                last_link_id: inputs.last_link_id,
            };

            let engine = LinkEngine::with_rules(rules);
            let batch = engine.run_parallel(input, self.config.workers).await?;

            write_linked_csv(&batch.records, output)?;

            Ok(batch.summary)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    const EVENT_HEADER: &str =
        "card_id,sequence,timestamp,program,transfer_code,route_id,amount,latitude,longitude,transport_class\n";

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_worker_config_default_uses_available_cores() {
        let config = WorkerConfig::default();
        assert_eq!(config.workers, num_cpus::get());
    }

    #[test]
    fn test_worker_config_zero_falls_back_to_default() {
        let config = WorkerConfig::new(0);
        assert_eq!(config.workers, num_cpus::get());
    }

    #[test]
    fn test_worker_config_custom_count() {
        let config = WorkerConfig::new(3);
        assert_eq!(config.workers, 3);
    }

    #[test]
    fn test_parallel_strategy_links_a_simple_batch() {
        let transfers = create_temp_csv(&format!(
            "{}1,5,2025-12-11 08:15:00,0002,5,1a2b,0,,,1\n\
             2,9,2025-12-11 10:00:00,0003,1,3c4d,0,,,1\n",
            EVENT_HEADER
        ));
        let history = create_temp_csv(&format!(
            "{}1,4,2025-12-11 08:03:00,0002,4,1a2b,2400,,,1\n\
             2,8,2025-12-11 09:40:00,0003,0,3c4d,2400,,,1\n",
            EVENT_HEADER
        ));
        let routes = create_temp_csv("route_id,operator\n1a2b,Linea Uno\n3c4d,Linea Dos\n");

        let strategy = ParallelProcessingStrategy::new(WorkerConfig::new(4));
        let inputs = BatchPaths {
            transfers: transfers.path().to_path_buf(),
            history: history.path().to_path_buf(),
            routes: routes.path().to_path_buf(),
            last_link_id: 0,
        };

        let mut output = Vec::new();
        let summary = strategy.process(&inputs, &mut output).unwrap();

        assert_eq!(summary.transfers, 2);
        assert_eq!(summary.linked, 2);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("same-operator"));
    }

    #[test]
    fn test_parallel_strategy_missing_file_is_fatal() {
        let history = create_temp_csv(EVENT_HEADER);
        let routes = create_temp_csv("route_id,operator\n1a2b,Linea Uno\n");

        let strategy = ParallelProcessingStrategy::new(WorkerConfig::default());
        let inputs = BatchPaths {
            transfers: Path::new("nonexistent.csv").to_path_buf(),
            history: history.path().to_path_buf(),
            routes: routes.path().to_path_buf(),
            last_link_id: 0,
        };

        let mut output = Vec::new();
        let result = strategy.process(&inputs, &mut output);
        assert!(matches!(
            result.unwrap_err(),
            LinkError::FileNotFound { .. }
        ));
    }
}
