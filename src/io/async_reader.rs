//! Asynchronous CSV event reader
//!
//! Batch-reading interface over an event feed for the parallel strategy.
//! Uses csv-async for streaming parsing; conversion and validation go
//! through the same `csv_format` path as the synchronous reader, so both
//! strategies accept and reject exactly the same rows.

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use log::warn;

use crate::io::csv_format::{convert_event_record, CsvEventRecord};
use crate::types::Event;

/// One batch of rows pulled from the feed
#[derive(Debug, Default)]
pub struct EventBatch {
    /// Rows that passed input-shape validation
    pub events: Vec<Event>,

    /// Rows excluded as malformed
    pub rejected: u64,
}

/// Asynchronous CSV event reader
pub struct AsyncEventReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncEventReader<R> {
    /// Create a reader over an async byte stream of CSV data
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `batch_size` rows
    ///
    /// Malformed rows are logged, counted in the batch's `rejected` field
    /// and skipped; they still consume batch capacity so a pathological
    /// feed cannot stall the loop. An exhausted feed yields an empty batch.
    pub async fn read_batch(&mut self, batch_size: usize) -> EventBatch {
        let mut batch = EventBatch::default();
        let mut records = self.csv_reader.deserialize::<CsvEventRecord>();
        let mut rows = 0;

        while rows < batch_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_event_record(csv_record) {
                    Ok(event) => batch.events.push(event),
                    Err(e) => {
                        warn!("excluding malformed row: {}", e);
                        batch.rejected += 1;
                    }
                },
                Some(Err(e)) => {
                    warn!("excluding malformed row: {}", e);
                    batch.rejected += 1;
                }
                None => break,
            }
            rows += 1;
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::io::Cursor;

    const EVENT_HEADER: &str =
        "card_id,sequence,timestamp,program,transfer_code,route_id,amount,latitude,longitude,transport_class\n";

    #[tokio::test]
    async fn test_read_batch_respects_batch_size() {
        let csv_content = format!(
            "{}\
             1,5,2025-12-11 08:15:00,0002,5,1a2b,0,,,1\n\
             1,6,2025-12-11 08:25:00,0002,6,1a2b,0,,,1\n\
             2,3,2025-12-11 09:00:00,0003,1,3c4d,0,,,1\n",
            EVENT_HEADER
        );
        let mut reader = AsyncEventReader::new(Cursor::new(csv_content.into_bytes()));

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.events[0].sequence, 5);
        assert_eq!(batch.events[1].sequence, 6);

        let batch = reader.read_batch(2).await;
        assert_eq!(batch.events.len(), 1);
        assert_eq!(batch.events[0].card_id, 2);

        let batch = reader.read_batch(2).await;
        assert!(batch.events.is_empty());
        assert_eq!(batch.rejected, 0);
    }

    #[tokio::test]
    async fn test_read_batch_counts_malformed_rows() {
        let csv_content = format!(
            "{}\
             1,5,2025-12-11 08:15:00,0002,5,1a2b,0,,,1\n\
             1,6,bad-timestamp,0002,5,1a2b,0,,,1\n\
             1,7,2025-12-11 08:35:00,0002,5,1a2b,0,,,1\n",
            EVENT_HEADER
        );
        let mut reader = AsyncEventReader::new(Cursor::new(csv_content.into_bytes()));

        let batch = reader.read_batch(10).await;
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.rejected, 1);
    }

    #[tokio::test]
    async fn test_read_batch_on_empty_feed() {
        let mut reader = AsyncEventReader::new(Cursor::new(EVENT_HEADER.as_bytes().to_vec()));

        let batch = reader.read_batch(10).await;
        assert!(batch.events.is_empty());
        assert_eq!(batch.rejected, 0);
    }
}
