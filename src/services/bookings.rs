//! Booking store: reservations read from the bookings sheet

use async_trait::async_trait;
use std::collections::HashMap;

use crate::{
    config::SheetConfig,
    error::{AppError, AppResult},
    models::booking::BookingRow,
};

use super::google::GoogleSheetsClient;

const STATUS_COLUMN: &str = "Status";
const CHECK_IN_COLUMN: &str = "Check-in";
const CHECK_OUT_COLUMN: &str = "Check-out";

/// Read-only source of booking rows
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn fetch_rows(&self) -> AppResult<Vec<BookingRow>>;
}

/// Bookings kept in a Google sheet whose first row holds column headers
pub struct SheetsBookingStore {
    sheets: GoogleSheetsClient,
    sheet: SheetConfig,
}

impl SheetsBookingStore {
    pub fn new(sheets: GoogleSheetsClient, sheet: SheetConfig) -> Self {
        Self { sheets, sheet }
    }
}

#[async_trait]
impl BookingStore for SheetsBookingStore {
    async fn fetch_rows(&self) -> AppResult<Vec<BookingRow>> {
        let values = self
            .sheets
            .get_values(&self.sheet.spreadsheet_id, &self.sheet.range)
            .await?;
        let rows = rows_from_values(values)?;
        tracing::debug!("Fetched {} booking rows", rows.len());
        Ok(rows)
    }
}

/// Map a header row plus data rows onto [`BookingRow`]s. Cells missing at the
/// end of a short row read as empty strings.
pub fn rows_from_values(values: Vec<Vec<String>>) -> AppResult<Vec<BookingRow>> {
    let mut iter = values.into_iter();
    let header = match iter.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim(), i))
        .collect();

    let column = |name: &'static str| {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| AppError::parse("booking store", format!("missing {} column", name)))
    };
    let status = column(STATUS_COLUMN)?;
    let check_in = column(CHECK_IN_COLUMN)?;
    let check_out = column(CHECK_OUT_COLUMN)?;

    let cell = |row: &[String], i: usize| row.get(i).cloned().unwrap_or_default();

    Ok(iter
        .map(|row| BookingRow {
            status: cell(row.as_slice(), status),
            check_in: cell(row.as_slice(), check_in),
            check_out: cell(row.as_slice(), check_out),
        })
        .collect())
}
