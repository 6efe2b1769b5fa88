//! Synchronous CSV readers and the file-backed event source
//!
//! `EventReader` streams one event feed with an iterator interface,
//! yielding row-level errors inline so callers can count rejects without
//! aborting. `CsvEventSource` composes two readers into the engine's
//! `EventSource` contract, applying the feed filters the upstream store
//! normally applies: qualifying `(program, transfer_code)` combinations on
//! the transfer feed, positive amounts on the history feed.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};
use log::{debug, warn};

use crate::core::rules::LinkRules;
use crate::core::traits::{EventSource, Extraction};
use crate::io::csv_format::{convert_event_record, CsvEventRecord, CsvRouteRecord};
use crate::types::{Event, LinkError};

/// Open a CSV file with the reader configuration shared by all feeds
fn open_reader(path: &Path) -> Result<csv::Reader<File>, LinkError> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LinkError::file_not_found(path.display().to_string())
        } else {
            LinkError::from(e)
        }
    })?;

    Ok(ReaderBuilder::new()
        .trim(Trim::All)
        .buffer_capacity(8 * 1024)
        .from_reader(file))
}

/// Streaming iterator over one event feed
///
/// Yields `Ok(Event)` for rows that pass input-shape validation and
/// `Err(LinkError)` (with the line number where available) for rows that
/// do not. Memory usage is one record at a time.
#[derive(Debug)]
pub struct EventReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl EventReader {
    /// Open an event feed for streaming iteration
    pub fn new(path: &Path) -> Result<Self, LinkError> {
        Ok(Self {
            reader: open_reader(path)?,
            line_num: 1,
        })
    }
}

impl Iterator for EventReader {
    type Item = Result<Event, LinkError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvEventRecord>();

        let result = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num;

        Some(match result {
            Ok(record) => convert_event_record(record).map_err(|e| match e {
                LinkError::ParseError { message, .. } => LinkError::ParseError {
                    line: Some(line),
                    message,
                },
                other => other,
            }),
            Err(e) => Err(LinkError::from(e)),
        })
    }
}

/// Read the route → operator catalog entries from a CSV file
///
/// The catalog is small and fully trusted; a malformed row here is a
/// collaborator failure, not a row-level reject.
pub fn read_routes(path: &Path) -> Result<Vec<(String, String)>, LinkError> {
    let mut reader = open_reader(path)?;
    let mut entries = Vec::new();

    for result in reader.deserialize::<CsvRouteRecord>() {
        let record = result?;
        entries.push((record.route_id, record.operator));
    }

    Ok(entries)
}

/// File-backed implementation of the engine's event-source contract
///
/// Mirrors the store-side feed queries: the transfer feed keeps only
/// qualifying program/code combinations, the history feed keeps only
/// positive-amount events (free boardings cannot authorize a discount).
/// Rows failing shape validation are excluded, logged and counted.
#[derive(Debug)]
pub struct CsvEventSource {
    transfers_path: PathBuf,
    history_path: PathBuf,
    rules: LinkRules,
}

impl CsvEventSource {
    /// Create a source over the two feed files
    pub fn new(transfers_path: PathBuf, history_path: PathBuf, rules: LinkRules) -> Self {
        Self {
            transfers_path,
            history_path,
            rules,
        }
    }

    /// Drain one feed, splitting accepted events from counted rejects
    fn extract<F>(&self, path: &Path, keep: F) -> Result<Extraction, LinkError>
    where
        F: Fn(&Event) -> bool,
    {
        let reader = EventReader::new(path)?;
        let mut extraction = Extraction::default();
        let mut filtered: u64 = 0;

        for result in reader {
            match result {
                Ok(event) if keep(&event) => extraction.events.push(event),
                Ok(_) => filtered += 1,
                Err(e) if e.is_row_level() => {
                    warn!("excluding malformed row: {}", e);
                    extraction.rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if filtered > 0 {
            debug!(
                "filtered {} out-of-contract rows from {}",
                filtered,
                path.display()
            );
        }

        Ok(extraction)
    }
}

impl EventSource for CsvEventSource {
    fn transfer_events(&mut self) -> Result<Extraction, LinkError> {
        let rules = self.rules.clone();
        self.extract(&self.transfers_path, |event| {
            rules.is_qualifying_transfer(event.program, event.transfer_code)
        })
    }

    fn history_events(&mut self) -> Result<Extraction, LinkError> {
        self.extract(&self.history_path, |event| {
            event.amount > rust_decimal::Decimal::ZERO
        })
    }
}
