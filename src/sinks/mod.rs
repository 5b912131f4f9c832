//! Append-only outreach log destinations.
//!
//! Two interchangeable backends, chosen by configuration:
//! - [`sheets::SheetsLog`] — spreadsheet row append over the values REST API
//! - [`csv_file::CsvFileLog`] — row append to a local CSV file
//!
//! Both satisfy the same contract: append-only, one call produces at most
//! one new row, no read-modify-write. A failed append is reported to the
//! caller as a warning on the item's result; it never rolls back or blocks
//! an already-generated email.

use async_trait::async_trait;

use crate::types::LogRecord;

pub mod csv_file;
pub mod sheets;

/// Errors from log destinations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Credential or permission failure reaching the destination.
    #[error("log destination rejected credential: {0}")]
    Auth(String),
    /// Destination unreachable or the target reference is malformed.
    #[error("log destination unavailable: {0}")]
    Unavailable(String),
}

/// Append-only record sink.
#[async_trait]
pub trait OutreachLog: Send + Sync {
    /// Append one record as a new row.
    ///
    /// # Errors
    ///
    /// Returns [`LogError`] when the destination rejects the credential or
    /// is unreachable. Callers surface the failure but keep the generated
    /// email.
    async fn append(&self, record: &LogRecord) -> Result<(), LogError>;

    /// Human-readable destination identifier for log lines.
    fn destination(&self) -> String;
}
