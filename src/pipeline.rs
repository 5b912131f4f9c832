//! Outreach generation-and-logging pipeline.
//!
//! Sequences prompt construction → completion → sanitization → optional PDF
//! rendering → best-effort log append for a single lead, and fans the same
//! sequence out over a batch, one item at a time.
//!
//! Failure policy:
//! - validation fails the item before any network call;
//! - a completion failure aborts *that item's* generation (no partial email
//!   is ever returned) and, in batch mode, is recorded as that row's error
//!   while processing continues;
//! - a log failure never discards an already-produced email — it is
//!   surfaced as [`LogOutcome::Failed`] on the item's result, never
//!   swallowed.
//!
//! Batch processing is strictly sequential: item *i+1* starts only after
//! item *i*'s full sequence has returned.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::leads::ValidationError;
use crate::prompt::build_prompt;
use crate::providers::{CompletionClient, CompletionError};
use crate::render::{render_bundle, render_pdf, RenderError};
use crate::sanitize::sanitize;
use crate::sinks::OutreachLog;
use crate::types::{
    GeneratedEmail, Lead, LogRecord, OutreachKind, OutreachRequest, SenderProfile,
};

/// Static reference document included in every batch bundle.
const REFERENCE_DOC_NAME: &str = "about_the_sender.txt";
const REFERENCE_DOC: &str = "\
This bundle was produced by the outreach tool.

Each PDF is one generated outreach email, named {industry}_{contact}.pdf
(with '@' and '.' made filesystem-safe). Every email in this bundle has a
matching row in the outreach log. Replies and bounces are not tracked here.
";

/// Errors that abort a single pipeline item.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input failed validation before any network call.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// The completion provider failed; no email was produced.
    #[error(transparent)]
    Completion(#[from] CompletionError),
    /// Artifact rendering failed after generation.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Outcome of the best-effort log append attached to every generated email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// One row was appended.
    Logged,
    /// The append failed; the generated email is unaffected.
    Failed(String),
}

impl std::fmt::Display for LogOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logged => write!(f, "logged"),
            Self::Failed(reason) => write!(f, "log failed: {reason}"),
        }
    }
}

/// Result of one successful single-item run.
#[derive(Debug, Clone)]
pub struct OutreachOutcome {
    /// The generated email.
    pub email: GeneratedEmail,
    /// Rendered PDF bytes, when requested.
    pub pdf: Option<Vec<u8>>,
    /// What happened to the log append. Always present, never swallowed.
    pub log_outcome: LogOutcome,
}

/// One row of the batch aggregate table.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// Zero-based input row index.
    pub index: usize,
    /// The input lead, echoed for the report.
    pub lead: Lead,
    /// The generated email, absent when this row errored.
    pub email: Option<GeneratedEmail>,
    /// The row's error, absent on success.
    pub error: Option<String>,
    /// Log outcome for successful rows.
    pub log_outcome: Option<LogOutcome>,
}

/// Aggregate outcome of a batch run: one entry per input row, in input
/// order, plus an optional bundle of all successfully rendered PDFs.
#[derive(Debug)]
pub struct BatchRun {
    /// Per-row outcomes; `items.len()` always equals the input row count.
    pub items: Vec<BatchItem>,
    /// ZIP of successful PDFs plus the static reference document. `None`
    /// when no item produced a PDF.
    pub bundle: Option<Vec<u8>>,
}

impl BatchRun {
    /// Number of rows that errored.
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|i| i.error.is_some()).count()
    }

    /// Export the aggregate table as CSV, generated-email column included.
    ///
    /// # Errors
    ///
    /// Returns an error if CSV serialization fails.
    pub fn report_csv(&self) -> anyhow::Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "row",
            "name",
            "company",
            "industry",
            "contact",
            "status",
            "generated_email",
            "log_outcome",
            "error",
        ])?;
        for item in &self.items {
            let status = if item.error.is_some() { "error" } else { "ok" };
            let row = item.index.to_string();
            let log_outcome = item
                .log_outcome
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            writer.write_record([
                row.as_str(),
                item.lead.name.as_str(),
                item.lead.company.as_str(),
                item.lead.industry.as_str(),
                item.lead.contact.as_str(),
                status,
                item.email.as_ref().map_or("", |e| e.body.as_str()),
                log_outcome.as_str(),
                item.error.as_deref().unwrap_or(""),
            ])?;
        }
        Ok(writer.into_inner()?)
    }
}

/// Artifact filename for one lead: `{industry}_{contact}.pdf` with `@` and
/// `.` made filesystem-safe, matching the historical naming scheme.
pub fn artifact_name(lead: &Lead) -> String {
    format!(
        "{}_{}.pdf",
        lead.industry,
        lead.contact.replace('@', "_at_").replace('.', "_")
    )
}

/// The pipeline orchestrator. The only component aware of both single and
/// batch modes.
pub struct Pipeline {
    client: Arc<dyn CompletionClient>,
    log: Arc<dyn OutreachLog>,
}

impl Pipeline {
    /// Wire a pipeline from its collaborators. Both arrive as explicit
    /// values; there is no ambient session state.
    pub fn new(client: Arc<dyn CompletionClient>, log: Arc<dyn OutreachLog>) -> Self {
        Self { client, log }
    }

    /// Run the single-item flow.
    ///
    /// Requires a non-empty contact. A well-formed email address is only
    /// required by the mail-send action (see [`crate::mail`]); generation
    /// and logging proceed for any contact string, phone numbers included.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] on validation, completion, or render
    /// failure. Log failure is not an error; it is reported in
    /// [`OutreachOutcome::log_outcome`].
    pub async fn run_single(
        &self,
        request: OutreachRequest,
        want_pdf: bool,
    ) -> Result<OutreachOutcome, PipelineError> {
        if request.lead.contact.trim().is_empty() {
            return Err(ValidationError::MissingContact.into());
        }

        let prompt = build_prompt(&request);
        let raw = self.client.complete(&prompt).await?;
        let body = sanitize(&raw);
        let email = GeneratedEmail::from_body(body);

        let pdf = if want_pdf {
            Some(render_pdf(&email.body)?)
        } else {
            None
        };

        let record = LogRecord::new(request.lead.clone(), email.body.clone(), request.kind);
        let log_outcome = match self.log.append(&record).await {
            Ok(()) => LogOutcome::Logged,
            Err(e) => {
                // Best-effort sink: surface, keep the email.
                warn!(destination = %self.log.destination(), error = %e, "log append failed");
                LogOutcome::Failed(e.to_string())
            }
        };

        info!(
            contact = %request.lead.contact,
            kind = request.kind.log_label(),
            model = self.client.model_id(),
            log = %log_outcome,
            "outreach email generated"
        );
        Ok(OutreachOutcome {
            email,
            pdf,
            log_outcome,
        })
    }

    /// Run the batch flow over parsed leads, sequentially and to completion.
    ///
    /// Every row is attempted; per-item failures become that row's error
    /// entry and never stop subsequent rows. Returns once all items have
    /// been attempted — there is no early-exit path.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Render`] only if final bundle packaging
    /// fails; per-item errors are inside [`BatchRun::items`].
    pub async fn run_batch(
        &self,
        leads: Vec<Lead>,
        sender: &SenderProfile,
    ) -> Result<BatchRun, PipelineError> {
        let total = leads.len();
        let mut items = Vec::with_capacity(total);
        let mut artifacts: Vec<(String, Vec<u8>)> = Vec::new();

        for (index, lead) in leads.into_iter().enumerate() {
            let request = OutreachRequest {
                lead: lead.clone(),
                sender: sender.clone(),
                kind: OutreachKind::Initial,
                prior_body: None,
            };
            match self.run_single(request, true).await {
                Ok(outcome) => {
                    if let Some(pdf) = &outcome.pdf {
                        artifacts.push((artifact_name(&lead), pdf.clone()));
                    }
                    items.push(BatchItem {
                        index,
                        lead,
                        email: Some(outcome.email),
                        error: None,
                        log_outcome: Some(outcome.log_outcome),
                    });
                }
                Err(e) => {
                    warn!(row = index, error = %e, "batch item failed; continuing");
                    items.push(BatchItem {
                        index,
                        lead,
                        email: None,
                        error: Some(e.to_string()),
                        log_outcome: None,
                    });
                }
            }
        }

        let bundle = if artifacts.is_empty() {
            None
        } else {
            artifacts.push((
                REFERENCE_DOC_NAME.to_owned(),
                REFERENCE_DOC.as_bytes().to_vec(),
            ));
            Some(render_bundle(&artifacts)?)
        };

        info!(
            total,
            errors = items.iter().filter(|i| i.error.is_some()).count(),
            "batch complete"
        );
        Ok(BatchRun { items, bundle })
    }

    /// Run the follow-up flow: re-enter the pipeline with
    /// [`OutreachKind::FollowUp`], referencing the prior body when one is
    /// available. Logs a distinct record; the original is never touched.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Pipeline::run_single`].
    pub async fn run_follow_up(
        &self,
        lead: Lead,
        sender: SenderProfile,
        prior_body: Option<String>,
        want_pdf: bool,
    ) -> Result<OutreachOutcome, PipelineError> {
        self.run_single(
            OutreachRequest {
                lead,
                sender,
                kind: OutreachKind::FollowUp,
                prior_body,
            },
            want_pdf,
        )
        .await
    }
}
