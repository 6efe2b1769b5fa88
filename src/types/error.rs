//! Error types for the transfer linking engine
//!
//! # Error Categories
//!
//! - **Collaborator failures**: missing input file, unreadable store, empty
//!   route catalog. Fatal: the batch does not start or is aborted.
//! - **Row-level input-shape errors**: malformed CSV rows, unknown wire
//!   codes, negative amounts. Recoverable: the row is excluded and counted.
//! - **Sanity trips**: too many excluded rows fail the whole batch rather
//!   than silently producing a mostly-empty result.
//! - **Worker failures**: a fault inside a chunk worker aborts the entire
//!   batch; nothing is handed to the sink.
//!
//! "No mother found", "no operator match" and "no valid interval" are NOT
//! errors: they are expected absences represented as `Option` values on the
//! output record.

use thiserror::Error;

/// Main error type for the linking engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    /// Input file not found at the specified path
    ///
    /// Fatal: the batch cannot start.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error while reading inputs or writing output
    ///
    /// Fatal (permissions, disk full, truncated stream).
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV row could not be parsed
    ///
    /// Recoverable: the row is excluded, counted against the reject-rate
    /// ceiling, and processing continues.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown fare-program wire code on an event row
    ///
    /// Recoverable: the row is excluded and counted.
    #[error("Unknown fare program '{code}' for card {card}")]
    UnknownProgram {
        /// The unrecognized entity wire code
        code: String,
        /// Card the row belonged to
        card: String,
    },

    /// Unknown transport-class wire code on an event row
    ///
    /// Recoverable: the row is excluded and counted.
    #[error("Unknown transport class '{code}' for card {card}")]
    UnknownTransportClass {
        /// The unrecognized transport wire code
        code: String,
        /// Card the row belonged to
        card: String,
    },

    /// Event row carried a negative amount
    ///
    /// Amounts are money paid and can never be negative. Recoverable: the
    /// row is excluded and counted.
    #[error("Negative amount '{amount}' for card {card} sequence {sequence}")]
    NegativeAmount {
        /// The offending amount as read from the row
        amount: String,
        /// Card the row belonged to
        card: String,
        /// Sequence number of the row
        sequence: i64,
    },

    /// Timestamp field could not be parsed
    ///
    /// Recoverable: the row is excluded and counted.
    #[error("Invalid timestamp '{value}' for card {card}")]
    InvalidTimestamp {
        /// The unparseable timestamp text
        value: String,
        /// Card the row belonged to
        card: String,
    },

    /// Too many rows were excluded as malformed
    ///
    /// Trips when the excluded share of an input feed exceeds the
    /// configured ceiling. Fatal: a mostly-empty result must not be
    /// silently persisted.
    #[error(
        "Rejected {rejected} of {total} input rows (ceiling {max_rate}), refusing to continue"
    )]
    ExcessiveRejects {
        /// Rows excluded as malformed
        rejected: u64,
        /// Total rows read
        total: u64,
        /// Configured maximum reject share, 0..1
        max_rate: f64,
    },

    /// The route catalog resolved to zero entries
    ///
    /// Fatal collaborator failure: every operator lookup would miss and the
    /// output would be systematically wrong.
    #[error("Route catalog is empty")]
    EmptyRouteCatalog,

    /// A chunk worker panicked or was cancelled
    ///
    /// Fatal: the batch is aborted without partial output.
    #[error("Chunk worker failed: {message}")]
    WorkerPanic {
        /// Join-error description from the runtime
        message: String,
    },

    /// The async runtime could not be constructed
    #[error("Runtime error: {message}")]
    RuntimeError {
        /// Description of the runtime failure
        message: String,
    },
}

impl From<std::io::Error> for LinkError {
    fn from(error: std::io::Error) -> Self {
        LinkError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LinkError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LinkError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LinkError {
    /// True for row-level input-shape errors that exclude a single row
    /// without aborting the batch.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            LinkError::ParseError { .. }
                | LinkError::UnknownProgram { .. }
                | LinkError::UnknownTransportClass { .. }
                | LinkError::NegativeAmount { .. }
                | LinkError::InvalidTimestamp { .. }
        )
    }

    /// Create a FileNotFound error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        LinkError::FileNotFound { path: path.into() }
    }

    /// Create an UnknownProgram error
    pub fn unknown_program(code: &str, card: &str) -> Self {
        LinkError::UnknownProgram {
            code: code.to_string(),
            card: card.to_string(),
        }
    }

    /// Create an UnknownTransportClass error
    pub fn unknown_transport_class(code: &str, card: &str) -> Self {
        LinkError::UnknownTransportClass {
            code: code.to_string(),
            card: card.to_string(),
        }
    }

    /// Create a NegativeAmount error
    pub fn negative_amount(amount: &str, card: &str, sequence: i64) -> Self {
        LinkError::NegativeAmount {
            amount: amount.to_string(),
            card: card.to_string(),
            sequence,
        }
    }

    /// Create an InvalidTimestamp error
    pub fn invalid_timestamp(value: &str, card: &str) -> Self {
        LinkError::InvalidTimestamp {
            value: value.to_string(),
            card: card.to_string(),
        }
    }

    /// Create a WorkerPanic error
    pub fn worker_panic(message: impl Into<String>) -> Self {
        LinkError::WorkerPanic {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::file_not_found(
        LinkError::FileNotFound { path: "transfers.csv".to_string() },
        "File not found: transfers.csv"
    )]
    #[case::io_error(
        LinkError::IoError { message: "Permission denied".to_string() },
        "I/O error: Permission denied"
    )]
    #[case::parse_error_with_line(
        LinkError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LinkError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::unknown_program(
        LinkError::unknown_program("0009", "12345"),
        "Unknown fare program '0009' for card 12345"
    )]
    #[case::unknown_transport(
        LinkError::unknown_transport_class("7", "12345"),
        "Unknown transport class '7' for card 12345"
    )]
    #[case::negative_amount(
        LinkError::negative_amount("-200", "12345", 17),
        "Negative amount '-200' for card 12345 sequence 17"
    )]
    #[case::invalid_timestamp(
        LinkError::invalid_timestamp("not-a-date", "12345"),
        "Invalid timestamp 'not-a-date' for card 12345"
    )]
    #[case::excessive_rejects(
        LinkError::ExcessiveRejects { rejected: 30, total: 100, max_rate: 0.25 },
        "Rejected 30 of 100 input rows (ceiling 0.25), refusing to continue"
    )]
    #[case::empty_catalog(LinkError::EmptyRouteCatalog, "Route catalog is empty")]
    #[case::worker_panic(
        LinkError::worker_panic("task 3 panicked"),
        "Chunk worker failed: task 3 panicked"
    )]
    fn test_error_display(#[case] error: LinkError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::parse(LinkError::ParseError { line: None, message: String::new() }, true)]
    #[case::program(LinkError::unknown_program("x", "1"), true)]
    #[case::transport(LinkError::unknown_transport_class("x", "1"), true)]
    #[case::negative(LinkError::negative_amount("-1", "1", 1), true)]
    #[case::timestamp(LinkError::invalid_timestamp("x", "1"), true)]
    #[case::file(LinkError::file_not_found("a.csv"), false)]
    #[case::catalog(LinkError::EmptyRouteCatalog, false)]
    #[case::worker(LinkError::worker_panic("boom"), false)]
    fn test_row_level_classification(#[case] error: LinkError, #[case] expected: bool) {
        assert_eq!(error.is_row_level(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LinkError = io_error.into();
        assert!(matches!(error, LinkError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
