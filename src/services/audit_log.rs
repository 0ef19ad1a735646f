//! Append-only audit log of every webhook invocation

use async_trait::async_trait;

use crate::{config::SheetConfig, error::AppResult, models::audit::AuditLogEntry};

use super::google::GoogleSheetsClient;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> AppResult<()>;
}

/// Audit rows appended to a Google sheet
pub struct SheetsAuditLog {
    sheets: GoogleSheetsClient,
    sheet: SheetConfig,
}

impl SheetsAuditLog {
    pub fn new(sheets: GoogleSheetsClient, sheet: SheetConfig) -> Self {
        Self { sheets, sheet }
    }
}

#[async_trait]
impl AuditLog for SheetsAuditLog {
    async fn append(&self, entry: &AuditLogEntry) -> AppResult<()> {
        self.sheets
            .append_row(&self.sheet.spreadsheet_id, &self.sheet.range, entry.to_row())
            .await
    }
}
