//! CSV format handling for event feeds and linked-transfer output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CsvEventRecord` / `CsvRouteRecord` structures for deserialization
//! - Conversion from CSV records to domain types, with row-level
//!   input-shape validation
//! - Linked-transfer output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use std::io::Write;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::{Event, FareProgram, GeoPoint, LinkError, LinkedTransfer, TransportClass};

/// Timestamp layout used by the farebox exports
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV record structure for event-feed deserialization
///
/// Both the transfer feed and the history feed share this shape. Wire
/// codes and the amount stay as text here so conversion can produce
/// row-level errors with context instead of opaque serde failures.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvEventRecord {
    pub card_id: u64,
    pub sequence: i64,
    pub timestamp: String,
    /// Entity wire code, e.g. `0002`
    pub program: String,
    pub transfer_code: u8,
    pub route_id: String,
    pub amount: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Transport-class wire code, `1` or `3`
    pub transport_class: String,
}

/// CSV record structure for route-catalog deserialization
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRouteRecord {
    pub route_id: String,
    pub operator: String,
}

/// Convert a CsvEventRecord to a domain Event
///
/// Validates the wire codes, the timestamp layout and the amount sign.
/// Every failure is a row-level error: the caller excludes the row,
/// counts it and continues.
pub fn convert_event_record(record: CsvEventRecord) -> Result<Event, LinkError> {
    let card = record.card_id.to_string();

    let timestamp = NaiveDateTime::parse_from_str(&record.timestamp, TIMESTAMP_FORMAT)
        .map_err(|_| LinkError::invalid_timestamp(&record.timestamp, &card))?;

    let program = FareProgram::from_wire(&record.program)
        .ok_or_else(|| LinkError::unknown_program(&record.program, &card))?;

    let transport_class = TransportClass::from_wire(&record.transport_class)
        .ok_or_else(|| LinkError::unknown_transport_class(&record.transport_class, &card))?;

    let amount = Decimal::from_str(record.amount.trim()).map_err(|_| LinkError::ParseError {
        line: None,
        message: format!("Invalid amount '{}' for card {}", record.amount, card),
    })?;
    if amount < Decimal::ZERO {
        return Err(LinkError::negative_amount(
            &record.amount,
            &card,
            record.sequence,
        ));
    }

    let location = match (record.latitude, record.longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoPoint {
            latitude,
            longitude,
        }),
        _ => None,
    };

    Ok(Event {
        card_id: record.card_id,
        sequence: record.sequence,
        timestamp,
        program,
        transfer_code: record.transfer_code,
        route_id: record.route_id,
        amount,
        location,
        transport_class,
    })
}

/// Output column set, one row per linked transfer
const OUTPUT_HEADER: [&str; 21] = [
    "link_id",
    "card_id",
    "transfer_timestamp",
    "transfer_sequence",
    "program",
    "transfer_code",
    "transfer_route",
    "destination_operator",
    "transfer_amount",
    "transport_class",
    "mother_timestamp",
    "mother_sequence",
    "mother_route",
    "origin_operator",
    "mother_amount",
    "interval_minutes",
    "transfer_ordinal",
    "saved_amount",
    "discount_tier",
    "relationship",
    "mother_program",
];

/// Write linked-transfer records to CSV format
///
/// Rows are sorted by `link_id`, so the byte output is reproducible for a
/// given record set. Absent values (no mother, no operator, no interval)
/// serialize as empty fields.
pub fn write_linked_csv(
    records: &[LinkedTransfer],
    output: &mut dyn Write,
) -> Result<(), LinkError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(OUTPUT_HEADER)
        .map_err(LinkError::from)?;

    let mut sorted: Vec<&LinkedTransfer> = records.iter().collect();
    sorted.sort_by_key(|record| record.link_id);

    for record in sorted {
        let transfer = &record.transfer;
        let mother = record.mother.as_ref();

        writer
            .write_record(&[
                record.link_id.to_string(),
                transfer.card_id.to_string(),
                transfer.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                transfer.sequence.to_string(),
                transfer.program.wire_code().to_string(),
                transfer.transfer_code.to_string(),
                transfer.route_id.clone(),
                record.destination_operator.clone().unwrap_or_default(),
                transfer.amount.to_string(),
                transfer.transport_class.wire_code().to_string(),
                mother
                    .map(|m| m.timestamp.format(TIMESTAMP_FORMAT).to_string())
                    .unwrap_or_default(),
                mother.map(|m| m.sequence.to_string()).unwrap_or_default(),
                mother.map(|m| m.route_id.clone()).unwrap_or_default(),
                record.origin_operator.clone().unwrap_or_default(),
                mother.map(|m| m.amount.to_string()).unwrap_or_default(),
                record
                    .interval_minutes
                    .map(|i| i.to_string())
                    .unwrap_or_default(),
                record.transfer_ordinal.to_string(),
                record.saved_amount.to_string(),
                record.discount_tier.to_string(),
                record.relationship.to_string(),
                mother
                    .map(|m| m.program.wire_code().to_string())
                    .unwrap_or_default(),
            ])
            .map_err(LinkError::from)?;
    }

    writer
        .flush()
        .map_err(|e| LinkError::IoError {
            message: e.to_string(),
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiscountRate, DiscountTier, Relationship};
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn record() -> CsvEventRecord {
        CsvEventRecord {
            card_id: 4270013,
            sequence: 6,
            timestamp: "2025-12-11 08:15:00".to_string(),
            program: "0002".to_string(),
            transfer_code: 5,
            route_id: "1a2b".to_string(),
            amount: "0".to_string(),
            latitude: Some(-25.28),
            longitude: Some(-57.63),
            transport_class: "1".to_string(),
        }
    }

    #[test]
    fn test_convert_valid_record() {
        let event = convert_event_record(record()).unwrap();

        assert_eq!(event.card_id, 4270013);
        assert_eq!(event.sequence, 6);
        assert_eq!(event.program, FareProgram::ProgramA);
        assert_eq!(event.transfer_code, 5);
        assert_eq!(event.amount, dec!(0));
        assert_eq!(event.transport_class, TransportClass::Conventional);
        assert_eq!(
            event.timestamp,
            NaiveDate::from_ymd_opt(2025, 12, 11)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap()
        );
        let location = event.location.unwrap();
        assert_eq!(location.latitude, -25.28);
    }

    #[test]
    fn test_convert_record_without_fix_has_no_location() {
        let mut input = record();
        input.latitude = None;

        let event = convert_event_record(input).unwrap();
        assert_eq!(event.location, None);
    }

    #[rstest]
    #[case::bad_timestamp("timestamp", "11/12/2025")]
    #[case::unknown_program("program", "0009")]
    #[case::unknown_transport("transport_class", "9")]
    #[case::bad_amount("amount", "two thousand")]
    #[case::negative_amount("amount", "-100")]
    fn test_convert_rejects_malformed_rows(#[case] field: &str, #[case] value: &str) {
        let mut input = record();
        match field {
            "timestamp" => input.timestamp = value.to_string(),
            "program" => input.program = value.to_string(),
            "transport_class" => input.transport_class = value.to_string(),
            "amount" => input.amount = value.to_string(),
            _ => unreachable!(),
        }

        let error = convert_event_record(input).unwrap_err();
        assert!(error.is_row_level(), "unexpected error class: {:?}", error);
    }

    #[test]
    fn test_convert_rejects_negative_amount_specifically() {
        let mut input = record();
        input.amount = "-2400".to_string();

        let error = convert_event_record(input).unwrap_err();
        assert!(matches!(error, LinkError::NegativeAmount { .. }));
    }

    fn linked(link_id: i64, with_mother: bool) -> LinkedTransfer {
        let transfer = convert_event_record(record()).unwrap();
        let mother = with_mother.then(|| {
            let mut record = record();
            record.sequence = 4;
            record.transfer_code = 4;
            record.amount = "2400".to_string();
            record.timestamp = "2025-12-11 08:03:00".to_string();
            convert_event_record(record).unwrap()
        });

        LinkedTransfer {
            link_id,
            transfer,
            mother,
            interval_minutes: with_mother.then_some(12.0),
            transfer_ordinal: 1,
            saved_amount: dec!(2400),
            discount_tier: DiscountTier::Classified {
                program: FareProgram::ProgramA,
                trip: Some(1),
                transfer: 1,
                rate: DiscountRate::Full,
            },
            origin_operator: with_mother.then(|| "Linea Uno".to_string()),
            destination_operator: Some("Linea Uno".to_string()),
            relationship: if with_mother {
                Relationship::SameOperator
            } else {
                Relationship::NoMother
            },
        }
    }

    #[test]
    fn test_write_linked_csv_full_record() {
        let mut output = Vec::new();
        write_linked_csv(&[linked(42, true)], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), OUTPUT_HEADER.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "42,4270013,2025-12-11 08:15:00,6,0002,5,1a2b,Linea Uno,0,1,\
             2025-12-11 08:03:00,4,1a2b,Linea Uno,2400,12,1,2400,\
             program-a/trip1/transfer1/100%,same-operator,0002"
        );
    }

    #[test]
    fn test_write_linked_csv_absent_fields_are_empty() {
        let mut output = Vec::new();
        write_linked_csv(&[linked(7, false)], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(
            row,
            "7,4270013,2025-12-11 08:15:00,6,0002,5,1a2b,Linea Uno,0,1,\
             ,,,,,,1,2400,program-a/trip1/transfer1/100%,no-mother,"
        );
    }

    #[test]
    fn test_write_linked_csv_sorts_by_link_id() {
        let mut output = Vec::new();
        write_linked_csv(&[linked(9, false), linked(3, false)], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let first_fields: Vec<&str> = text.lines().nth(1).unwrap().split(',').collect();
        let second_fields: Vec<&str> = text.lines().nth(2).unwrap().split(',').collect();
        assert_eq!(first_fields[0], "3");
        assert_eq!(second_fields[0], "9");
    }

    #[test]
    fn test_write_linked_csv_empty_set_is_header_only() {
        let mut output = Vec::new();
        write_linked_csv(&[], &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, format!("{}\n", OUTPUT_HEADER.join(",")));
    }
}
