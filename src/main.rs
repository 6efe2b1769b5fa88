//! Transfer Linker CLI
//!
//! Command-line interface for linking transfer validations from CSV feeds.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transfers.csv history.csv routes.csv > linked.csv
//! cargo run -- --strategy sync transfers.csv history.csv routes.csv
//! cargo run -- --workers 8 --last-link-id 7040 -o linked.csv \
//!     transfers.csv history.csv routes.csv
//! ```
//!
//! The program reads the transfer feed, the history feed and the route
//! catalog, links every transfer to its mother validation, and writes the
//! enriched records as CSV. With `--output` the file is written to a
//! temporary sibling and renamed into place, so a failed batch never
//! leaves a half-written result where the old one was.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, excessive rejects, etc.)

use std::fs::{self, File};
use std::path::Path;
use std::process;

use log::info;

use transfer_linker::cli;
use transfer_linker::strategy::{self, BatchPaths, ProcessingStrategy};
use transfer_linker::types::LinkError;

fn main() {
    env_logger::init();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Parallel) {
            Some(args.to_worker_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let inputs = BatchPaths {
        transfers: args.transfers,
        history: args.history,
        routes: args.routes,
        last_link_id: args.last_link_id,
    };

    let result = match &args.output {
        Some(path) => run_to_file(strategy.as_ref(), &inputs, path),
        None => strategy.process(&inputs, &mut std::io::stdout()),
    };

    match result {
        Ok(summary) => {
            info!(
                "linked {} of {} transfers ({} rejected rows)",
                summary.linked, summary.transfers, summary.rejected_rows
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Run the batch into a temporary sibling file and rename it into place
///
/// The rename happens only after the batch fully succeeded, coupling
/// "replace the previous output" and "write the new one" into a single
/// all-or-nothing step.
fn run_to_file(
    strategy: &dyn ProcessingStrategy,
    inputs: &BatchPaths,
    path: &Path,
) -> Result<transfer_linker::BatchSummary, LinkError> {
    let tmp_path = path.with_extension("tmp");

    let mut tmp = File::create(&tmp_path)?;
    let summary = match strategy.process(inputs, &mut tmp) {
        Ok(summary) => summary,
        Err(e) => {
            drop(tmp);
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
    };

    fs::rename(&tmp_path, path)?;
    Ok(summary)
}
