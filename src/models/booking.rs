//! Booking sheet rows and parsed booking records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Status value (after trimming and lowercasing) of rows that take part in
/// turnover decisions
pub const ACCEPTED_STATUS: &str = "accepted";

/// A booking row as read from the sheet, dates still unparsed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    pub status: String,
    pub check_in: String,
    pub check_out: String,
}

/// A booking with parsed check-in and check-out dates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRecord {
    pub status: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

/// True when `status` reads "accepted", ignoring case and surrounding whitespace
pub fn is_accepted_status(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case(ACCEPTED_STATUS)
}

/// Parse a sheet date cell. Only the leading token counts, so
/// `"2024-06-01 15:00 PM"` reads as 2024-06-01.
pub fn parse_booking_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let date_part = raw.split_whitespace().next().unwrap_or("");
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
}

impl BookingRow {
    pub fn is_accepted(&self) -> bool {
        is_accepted_status(&self.status)
    }

    /// Parse both date columns
    pub fn parse(&self) -> Result<BookingRecord, BookingParseError> {
        let check_in = parse_booking_date(&self.check_in).map_err(|_| BookingParseError {
            column: "Check-in",
            value: self.check_in.clone(),
        })?;
        let check_out = parse_booking_date(&self.check_out).map_err(|_| BookingParseError {
            column: "Check-out",
            value: self.check_out.clone(),
        })?;

        Ok(BookingRecord {
            status: self.status.clone(),
            check_in,
            check_out,
        })
    }
}

impl BookingRecord {
    pub fn is_accepted(&self) -> bool {
        is_accepted_status(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {column} date {value:?}")]
pub struct BookingParseError {
    pub column: &'static str,
    pub value: String,
}

/// Keep the accepted rows and parse their dates. Rows with any other status
/// are dropped without looking at their dates.
pub fn accepted_records(rows: &[BookingRow]) -> Result<Vec<BookingRecord>, BookingParseError> {
    rows.iter()
        .filter(|row| row.is_accepted())
        .map(BookingRow::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, check_in: &str, check_out: &str) -> BookingRow {
        BookingRow {
            status: status.to_string(),
            check_in: check_in.to_string(),
            check_out: check_out.to_string(),
        }
    }

    #[test]
    fn test_status_normalization() {
        assert!(is_accepted_status("accepted"));
        assert!(is_accepted_status("  Accepted "));
        assert!(is_accepted_status("ACCEPTED"));
        assert!(!is_accepted_status("cancelled"));
        assert!(!is_accepted_status(""));
    }

    #[test]
    fn test_parse_date_with_trailing_text() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(parse_booking_date("2024-06-01").unwrap(), expected);
        assert_eq!(parse_booking_date(" 2024-06-01 3:00 PM").unwrap(), expected);
        assert!(parse_booking_date("06/01/2024").is_err());
        assert!(parse_booking_date("").is_err());
    }

    #[test]
    fn test_accepted_records_skips_other_statuses() {
        let rows = vec![
            row("Accepted", "2024-06-01", "2024-06-05 11:00"),
            row("cancelled", "not a date", "also not a date"),
            row("pending", "2024-06-01", "2024-06-02"),
        ];

        let records = accepted_records(&rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].check_out, NaiveDate::from_ymd_opt(2024, 6, 5).unwrap());
    }

    #[test]
    fn test_accepted_row_with_bad_date_fails() {
        let rows = vec![row("accepted", "2024-06-01", "soon")];
        let err = accepted_records(&rows).unwrap_err();
        assert_eq!(err.column, "Check-out");
        assert_eq!(err.value, "soon");
    }
}
