use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::strategy::WorkerConfig;
use crate::types::LinkId;

/// Link transfer validations to their mother validation
#[derive(Parser, Debug)]
#[command(name = "transfer-linker")]
#[command(
    about = "Link transfer fare validations to the mother validation that authorized them",
    long_about = None
)]
pub struct CliArgs {
    /// Transfer feed CSV (qualifying transfer events for the processing day)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfer-feed CSV file")]
    pub transfers: PathBuf,

    /// History feed CSV (candidate mother events over the lookback window)
    #[arg(value_name = "HISTORY", help = "Path to the history-feed CSV file")]
    pub history: PathBuf,

    /// Route catalog CSV mapping route ids to operator names
    #[arg(value_name = "ROUTES", help = "Path to the route-catalog CSV file")]
    pub routes: PathBuf,

    /// Output file for the linked records; stdout when omitted
    #[arg(
        long = "output",
        short = 'o',
        value_name = "FILE",
        help = "Write linked records to FILE (atomically) instead of stdout"
    )]
    pub output: Option<PathBuf>,

    /// Processing strategy to use
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "parallel",
        help = "Processing strategy: 'sync' for sequential or 'parallel' for chunked workers"
    )]
    pub strategy: StrategyType,

    /// Number of chunk workers (parallel mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of concurrent chunk workers (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Highest link id already persisted by the sink
    #[arg(
        long = "last-link-id",
        value_name = "ID",
        default_value_t = 0,
        help = "Correlative ids continue from ID + 1 (default: 0)"
    )]
    pub last_link_id: LinkId,
}

/// Available processing strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Parallel,
}

impl CliArgs {
    /// Create a WorkerConfig from CLI arguments
    ///
    /// Falls back to the default worker count when none was given; a zero
    /// count is rejected by `WorkerConfig::new` with a warning.
    pub fn to_worker_config(&self) -> WorkerConfig {
        match self.workers {
            Some(workers) => WorkerConfig::new(workers),
            None => WorkerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const BASE: [&str; 4] = ["program", "t.csv", "h.csv", "r.csv"];

    fn with_args(extra: &[&str]) -> Vec<String> {
        BASE.iter()
            .chain(extra.iter())
            .map(|s| s.to_string())
            .collect()
    }

    #[rstest]
    #[case::default_strategy(&[], StrategyType::Parallel)]
    #[case::explicit_sync(&["--strategy", "sync"], StrategyType::Sync)]
    #[case::explicit_parallel(&["--strategy", "parallel"], StrategyType::Parallel)]
    fn test_strategy_parsing(#[case] extra: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(with_args(extra)).unwrap();
        match (&parsed.strategy, &expected) {
            (StrategyType::Sync, StrategyType::Sync) => (),
            (StrategyType::Parallel, StrategyType::Parallel) => (),
            _ => panic!("Expected {:?}, got {:?}", expected, parsed.strategy),
        }
    }

    #[test]
    fn test_positional_paths() {
        let parsed = CliArgs::try_parse_from(with_args(&[])).unwrap();
        assert_eq!(parsed.transfers, PathBuf::from("t.csv"));
        assert_eq!(parsed.history, PathBuf::from("h.csv"));
        assert_eq!(parsed.routes, PathBuf::from("r.csv"));
        assert_eq!(parsed.output, None);
    }

    #[rstest]
    #[case::no_options(&[], None, 0)]
    #[case::workers(&["--workers", "8"], Some(8), 0)]
    #[case::last_link_id(&["--last-link-id", "7040"], None, 7040)]
    #[case::all_options(&["--workers", "8", "--last-link-id", "7040"], Some(8), 7040)]
    fn test_option_parsing(
        #[case] extra: &[&str],
        #[case] workers: Option<usize>,
        #[case] last_link_id: LinkId,
    ) {
        let parsed = CliArgs::try_parse_from(with_args(extra)).unwrap();
        assert_eq!(parsed.workers, workers);
        assert_eq!(parsed.last_link_id, last_link_id);
    }

    #[rstest]
    #[case::defaults(&[], num_cpus::get())]
    #[case::custom(&["--workers", "8"], 8)]
    #[case::zero_falls_back(&["--workers", "0"], num_cpus::get())]
    fn test_worker_config_conversion(#[case] extra: &[&str], #[case] expected: usize) {
        let parsed = CliArgs::try_parse_from(with_args(extra)).unwrap();
        assert_eq!(parsed.to_worker_config().workers, expected);
    }

    #[test]
    fn test_output_flag() {
        let parsed = CliArgs::try_parse_from(with_args(&["-o", "linked.csv"])).unwrap();
        assert_eq!(parsed.output, Some(PathBuf::from("linked.csv")));
    }

    #[rstest]
    #[case::missing_paths(&["program", "only.csv"])]
    #[case::invalid_strategy(&["program", "t.csv", "h.csv", "r.csv", "--strategy", "magic"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
