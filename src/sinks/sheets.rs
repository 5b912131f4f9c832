//! Spreadsheet log backend over the Google Sheets values REST API.
//!
//! One `values:append` call per record with `valueInputOption=RAW`; the
//! destination's own append atomicity is the only coordination relied on.
//! Token acquisition is out of scope — an opaque bearer token arrives from
//! the credential source at construction.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{LogError, OutreachLog};
use crate::types::LogRecord;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Spreadsheet destination identified by spreadsheet id + sheet name.
pub struct SheetsLog {
    spreadsheet_id: String,
    sheet_name: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for SheetsLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetsLog")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .field("sheet_name", &self.sheet_name)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl SheetsLog {
    /// Create a sheet-backed log. An absent token is reported as
    /// [`LogError::Auth`] on the first append, before any network call.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        spreadsheet_id: String,
        sheet_name: String,
        token: Option<String>,
        request_timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()?;
        Ok(Self {
            spreadsheet_id,
            sheet_name,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    fn append_url(&self) -> String {
        format!(
            "{SHEETS_API_BASE}/{}/values/{}:append?valueInputOption=RAW",
            self.spreadsheet_id, self.sheet_name
        )
    }
}

#[async_trait]
impl OutreachLog for SheetsLog {
    async fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| LogError::Auth("no spreadsheet token configured".to_owned()))?;
        if self.spreadsheet_id.trim().is_empty() {
            return Err(LogError::Unavailable(
                "no spreadsheet id configured".to_owned(),
            ));
        }

        // Spreadsheet cells are single-line; flatten before appending.
        let body = serde_json::json!({ "values": [record.flattened_row()] });

        let response = self
            .client
            .post(self.append_url())
            .header("authorization", format!("Bearer {token}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| LogError::Unavailable(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LogError::Auth(format!(
                "spreadsheet rejected token (status {})",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LogError::Unavailable(format!(
                "append returned status {}: {}",
                status.as_u16(),
                text.chars().take(256).collect::<String>()
            )));
        }

        debug!(sheet = %self.sheet_name, "appended outreach record to spreadsheet");
        Ok(())
    }

    fn destination(&self) -> String {
        format!("sheet:{}/{}", self.spreadsheet_id, self.sheet_name)
    }
}
