//! Local CSV log backend.
//!
//! Appends one quoted row per record to a tabular file, writing the header
//! first when the file is new or empty. Rows are never read back, mutated,
//! or deleted.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{LogError, OutreachLog};
use crate::types::LogRecord;

/// CSV file destination.
#[derive(Debug)]
pub struct CsvFileLog {
    path: PathBuf,
}

impl CsvFileLog {
    /// Create a CSV-backed log at `path`. The file is created on first
    /// append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append_row(&self, record: &LogRecord) -> Result<(), LogError> {
        let needs_header = match std::fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(map_io_error(&self.path, &e)),
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| map_io_error(&self.path, &e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer
                .write_record(LogRecord::header())
                .map_err(|e| LogError::Unavailable(e.to_string()))?;
        }
        // CSV quoting preserves embedded newlines; no flattening needed.
        writer
            .write_record(record.row())
            .map_err(|e| LogError::Unavailable(e.to_string()))?;
        writer
            .flush()
            .map_err(|e| map_io_error(&self.path, &e))?;
        Ok(())
    }
}

fn map_io_error(path: &Path, e: &std::io::Error) -> LogError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        LogError::Auth(format!("cannot write {}: {e}", path.display()))
    } else {
        LogError::Unavailable(format!("cannot write {}: {e}", path.display()))
    }
}

#[async_trait]
impl OutreachLog for CsvFileLog {
    async fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        self.append_row(record)?;
        debug!(path = %self.path.display(), "appended outreach record to CSV log");
        Ok(())
    }

    fn destination(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Lead, OutreachKind};

    fn record(name: &str, body: &str) -> LogRecord {
        LogRecord::new(
            Lead {
                name: name.to_owned(),
                job_title: "Ops Manager".to_owned(),
                company: "Acme Mining".to_owned(),
                industry: "Mining".to_owned(),
                recent_activity: Some("new site".to_owned()),
                contact: "jane@acme.test".to_owned(),
            },
            body.to_owned(),
            OutreachKind::Initial,
        )
    }

    #[tokio::test]
    async fn first_append_writes_header_then_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        let log = CsvFileLog::new(&path);

        log.append(&record("Jane Doe", "Dear Jane, ..."))
            .await
            .expect("appends");

        let contents = std::fs::read_to_string(&path).expect("readable");
        let mut lines = contents.lines();
        assert!(lines.next().expect("header").starts_with("timestamp,name"));
        assert!(contents.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn appends_accumulate_without_rewriting() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        let log = CsvFileLog::new(&path);

        log.append(&record("Jane Doe", "first")).await.expect("ok");
        log.append(&record("John Roe", "second")).await.expect("ok");

        let mut reader = csv::Reader::from_path(&path).expect("parses");
        let rows: Vec<csv::StringRecord> =
            reader.records().map(|r| r.expect("row parses")).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Jane Doe");
        assert_eq!(&rows[1][1], "John Roe");
    }

    #[tokio::test]
    async fn multiline_bodies_stay_one_logical_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("log.csv");
        let log = CsvFileLog::new(&path);

        log.append(&record("Jane Doe", "Dear Jane,\n\nBest,\nF."))
            .await
            .expect("ok");

        let mut reader = csv::Reader::from_path(&path).expect("parses");
        let rows: Vec<csv::StringRecord> =
            reader.records().map(|r| r.expect("row parses")).collect();
        assert_eq!(rows.len(), 1);
        assert!(rows[0][7].contains("Best,\nF."));
    }

    #[tokio::test]
    async fn unwritable_path_is_unavailable() {
        let log = CsvFileLog::new("/nonexistent-dir/log.csv");
        let err = log
            .append(&record("Jane Doe", "body"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, LogError::Unavailable(_) | LogError::Auth(_)));
    }
}
