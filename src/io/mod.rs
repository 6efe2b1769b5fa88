//! I/O module
//!
//! Handles CSV parsing and output.
//!
//! # Components
//!
//! - `csv_format` - CSV format handling (record conversion, output serialization)
//! - `sync_reader` - Synchronous readers and the file-backed event source
//! - `async_reader` - Asynchronous event reader with batch interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::{AsyncEventReader, EventBatch};
pub use csv_format::{convert_event_record, write_linked_csv, CsvEventRecord, CsvRouteRecord};
pub use sync_reader::{read_routes, CsvEventSource, EventReader};
