//! Core domain types for the outreach pipeline.
//!
//! Data flows strictly forward: [`Lead`] → prompt → raw completion text →
//! sanitized text → ([`GeneratedEmail`], [`LogRecord`]). Nothing here is
//! persisted by this crate; the only durable representation of a generated
//! email is the row appended to the outreach log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One prospect: the unit of input for a single generation.
///
/// Created from CLI flags or one row of an uploaded lead table. Immutable
/// once read; never stored beyond being echoed into the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Prospect's full name.
    pub name: String,
    /// Prospect's job title.
    pub job_title: String,
    /// Prospect's company.
    pub company: String,
    /// Industry or sector (open string set, e.g. "Mining").
    pub industry: String,
    /// Optional free-text note on recent activity (funding round, expansion).
    pub recent_activity: Option<String>,
    /// Contact string. Usually an email address, sometimes a phone number.
    pub contact: String,
}

/// The operator's own identity, echoed into the email signature block.
///
/// Process-wide defaults come from configuration; callers may override per
/// request. Immutable during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderProfile {
    /// Sender's name.
    pub name: String,
    /// Sender's position.
    pub position: String,
    /// Sender's company name.
    pub company: String,
    /// Sender's contact info (email, phone, or both).
    pub contact_info: String,
}

/// Which prompt template a request selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutreachKind {
    /// First contact with the lead.
    Initial,
    /// Polite nudge referencing a previously generated email.
    FollowUp,
}

impl OutreachKind {
    /// Label written into the log row's kind column.
    ///
    /// Follow-ups carry the explicit `Follow-Up` tag so they read as distinct
    /// records next to the original, matching the historical row format.
    pub fn log_label(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::FollowUp => "Follow-Up",
        }
    }
}

/// The unit of work submitted to the pipeline.
#[derive(Debug, Clone)]
pub struct OutreachRequest {
    /// The prospect to write to.
    pub lead: Lead,
    /// The operator's identity for the signature block.
    pub sender: SenderProfile,
    /// Template selector.
    pub kind: OutreachKind,
    /// Previously generated body, used by follow-up prompts when available.
    pub prior_body: Option<String>,
}

/// A generated email, derived from sanitized completion text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEmail {
    /// Subject, opportunistically extracted from a `Subject:` first line.
    pub subject: Option<String>,
    /// Full sanitized body text (including any `Subject:` line).
    pub body: String,
    /// When the email was generated.
    pub created_at: DateTime<Utc>,
}

impl GeneratedEmail {
    /// Wrap a sanitized body, extracting the subject if the first line
    /// carries a `Subject:` prefix (case-insensitive). The body is kept
    /// verbatim either way.
    pub fn from_body(body: String) -> Self {
        let subject = body.lines().next().and_then(|first| {
            let trimmed = first.trim();
            let lower = trimmed.to_ascii_lowercase();
            lower
                .strip_prefix("subject:")
                .map(|rest_lower| trimmed[trimmed.len().saturating_sub(rest_lower.len())..].trim())
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        });
        Self {
            subject,
            body,
            created_at: Utc::now(),
        }
    }

    /// Subject to use when dispatching mail: the extracted one, or a fallback.
    pub fn subject_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.subject.as_deref().unwrap_or(fallback)
    }
}

/// One row destined for the outreach log. Append-only; never mutated.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Arrival timestamp.
    pub timestamp: DateTime<Utc>,
    /// The lead whose fields are echoed into the row.
    pub lead: Lead,
    /// Sanitized email body.
    pub body: String,
    /// Which template produced the body.
    pub kind: OutreachKind,
}

/// Timestamp format used in log rows, matching the historical sheet layout.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl LogRecord {
    /// Build a record stamped with the current time.
    pub fn new(lead: Lead, body: String, kind: OutreachKind) -> Self {
        Self {
            timestamp: Utc::now(),
            lead,
            body,
            kind,
        }
    }

    /// Cell values in row order:
    /// `(timestamp, name, job_title, company, industry, recent_activity,
    /// contact, body, kind)`.
    pub fn row(&self) -> Vec<String> {
        vec![
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            self.lead.name.clone(),
            self.lead.job_title.clone(),
            self.lead.company.clone(),
            self.lead.industry.clone(),
            self.lead.recent_activity.clone().unwrap_or_default(),
            self.lead.contact.clone(),
            self.body.clone(),
            self.kind.log_label().to_owned(),
        ]
    }

    /// Row with all cells flattened to a single line (newlines become
    /// spaces). Spreadsheet destinations take one row per append call and
    /// render embedded newlines poorly.
    pub fn flattened_row(&self) -> Vec<String> {
        self.row()
            .into_iter()
            .map(|cell| cell.replace(['\r', '\n'], " "))
            .collect()
    }

    /// Header row for tabular file destinations.
    pub fn header() -> Vec<&'static str> {
        vec![
            "timestamp",
            "name",
            "job_title",
            "company",
            "industry",
            "recent_activity",
            "contact",
            "email_body",
            "kind",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lead() -> Lead {
        Lead {
            name: "Jane Doe".to_owned(),
            job_title: "Ops Manager".to_owned(),
            company: "Acme Mining".to_owned(),
            industry: "Mining".to_owned(),
            recent_activity: None,
            contact: "jane@acme.test".to_owned(),
        }
    }

    #[test]
    fn subject_extracted_from_first_line() {
        let email =
            GeneratedEmail::from_body("Subject: Partnership Opportunity\n\nDear Jane,".to_owned());
        assert_eq!(email.subject.as_deref(), Some("Partnership Opportunity"));
        assert!(email.body.starts_with("Subject:"), "body kept verbatim");
    }

    #[test]
    fn subject_extraction_is_case_insensitive() {
        let email = GeneratedEmail::from_body("SUBJECT:  Quick intro\nHi,".to_owned());
        assert_eq!(email.subject.as_deref(), Some("Quick intro"));
    }

    #[test]
    fn missing_subject_falls_back() {
        let email = GeneratedEmail::from_body("Dear Jane,\nHello.".to_owned());
        assert_eq!(email.subject, None);
        assert_eq!(email.subject_or("B2B Outreach"), "B2B Outreach");
    }

    #[test]
    fn empty_subject_line_is_ignored() {
        let email = GeneratedEmail::from_body("Subject:   \nDear Jane,".to_owned());
        assert_eq!(email.subject, None);
    }

    #[test]
    fn row_order_matches_sheet_layout() {
        let record = LogRecord::new(lead(), "Dear Jane, ...".to_owned(), OutreachKind::Initial);
        let row = record.row();
        assert_eq!(row.len(), LogRecord::header().len());
        assert_eq!(row[1], "Jane Doe");
        assert_eq!(row[2], "Ops Manager");
        assert_eq!(row[3], "Acme Mining");
        assert_eq!(row[4], "Mining");
        assert_eq!(row[6], "jane@acme.test");
        assert_eq!(row[7], "Dear Jane, ...");
        assert_eq!(row[8], "initial");
    }

    #[test]
    fn flattened_row_removes_newlines() {
        let record = LogRecord::new(
            lead(),
            "Dear Jane,\r\nGreat meeting you.\n-- F.".to_owned(),
            OutreachKind::FollowUp,
        );
        let row = record.flattened_row();
        assert!(row.iter().all(|cell| !cell.contains('\n')));
        assert_eq!(row[8], "Follow-Up");
    }
}
