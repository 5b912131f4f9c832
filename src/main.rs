//! Outreach CLI entry point.
//!
//! Provides `generate`, `bulk`, and `follow-up` subcommands for the
//! single-lead flow, the lead-table flow, and the follow-up flow.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use outreach::config::{LogBackend, OutreachConfig};
use outreach::credentials::{
    load_credentials, Credentials, GRAPH_ACCESS_TOKEN, OPENAI_API_KEY, SHEETS_ACCESS_TOKEN,
};
use outreach::leads::parse_lead_table;
use outreach::mail::{GraphMailer, MailMessage};
use outreach::pipeline::{LogOutcome, Pipeline};
use outreach::providers::openai::OpenAiClient;
use outreach::providers::CompletionClient;
use outreach::sinks::csv_file::CsvFileLog;
use outreach::sinks::sheets::SheetsLog;
use outreach::sinks::OutreachLog;
use outreach::types::{Lead, SenderProfile};

/// Outreach — B2B outreach email generator.
#[derive(Parser)]
#[command(name = "outreach", version, about)]
struct Cli {
    /// Path to the credentials `.env` file.
    #[arg(long, default_value = ".env", global = true)]
    env_file: PathBuf,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Generate one outreach email for a single lead.
    Generate {
        /// Lead fields.
        #[command(flatten)]
        lead: LeadArgs,
        /// Write the rendered PDF to this path.
        #[arg(long)]
        pdf: Option<PathBuf>,
        /// Dispatch the email through the configured mail API.
        #[arg(long)]
        send_mail: bool,
        /// Print a mailto: deep link for the local mail client.
        #[arg(long)]
        mailto: bool,
    },
    /// Generate outreach emails for every row of a lead table.
    Bulk {
        /// CSV file with lead columns (industry/sector and contact required).
        #[arg(long)]
        input: PathBuf,
        /// Write the ZIP bundle of PDFs to this path.
        #[arg(long)]
        bundle: Option<PathBuf>,
        /// Write the aggregate result table (CSV) to this path.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Generate a follow-up referencing a previously generated email.
    FollowUp {
        /// Lead fields.
        #[command(flatten)]
        lead: LeadArgs,
        /// File containing the previously generated body.
        #[arg(long)]
        prior_body: Option<PathBuf>,
        /// Write the rendered PDF to this path.
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

/// Lead fields shared by the single-item subcommands.
#[derive(Args)]
struct LeadArgs {
    /// Prospect name.
    #[arg(long, default_value = "")]
    name: String,
    /// Prospect job title.
    #[arg(long, default_value = "")]
    job_title: String,
    /// Prospect company.
    #[arg(long, default_value = "")]
    company: String,
    /// Prospect industry or sector.
    #[arg(long)]
    industry: String,
    /// Recent activity worth referencing.
    #[arg(long)]
    recent_activity: Option<String>,
    /// Contact string (email or phone).
    #[arg(long)]
    contact: String,
}

impl LeadArgs {
    fn into_lead(self) -> Lead {
        Lead {
            name: self.name,
            job_title: self.job_title,
            company: self.company,
            industry: self.industry,
            recent_activity: self.recent_activity,
            contact: self.contact,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    outreach::logging::init_cli();
    let cli = Cli::parse();

    let config = OutreachConfig::load().context("failed to load configuration")?;
    let credentials =
        load_credentials(&cli.env_file).context("failed to load credentials file")?;

    let pipeline = build_pipeline(&config, &credentials)?;
    let sender = config.sender.profile();

    match cli.command {
        Command::Generate {
            lead,
            pdf,
            send_mail,
            mailto,
        } => {
            handle_generate(
                &pipeline,
                &config,
                &credentials,
                lead.into_lead(),
                sender,
                pdf.as_deref(),
                send_mail,
                mailto,
            )
            .await
        }
        Command::Bulk {
            input,
            bundle,
            report,
        } => {
            handle_bulk(
                &pipeline,
                &input,
                sender,
                bundle.as_deref(),
                report.as_deref(),
            )
            .await
        }
        Command::FollowUp {
            lead,
            prior_body,
            pdf,
        } => {
            handle_follow_up(
                &pipeline,
                lead.into_lead(),
                sender,
                prior_body.as_deref(),
                pdf.as_deref(),
            )
            .await
        }
    }
}

/// Wire the pipeline from configuration and credentials.
fn build_pipeline(config: &OutreachConfig, credentials: &Credentials) -> anyhow::Result<Pipeline> {
    let client: Arc<dyn CompletionClient> = Arc::new(OpenAiClient::new(
        config.completion(),
        credentials.get(OPENAI_API_KEY).map(str::to_owned),
    )?);

    let log: Arc<dyn OutreachLog> = match config.log.backend {
        LogBackend::Csv => Arc::new(CsvFileLog::new(&config.log.csv_path)),
        LogBackend::Sheet => Arc::new(SheetsLog::new(
            config.log.spreadsheet_id.clone(),
            config.log.sheet_name.clone(),
            credentials.get(SHEETS_ACCESS_TOKEN).map(str::to_owned),
            config.llm.request_timeout_secs,
        )?),
    };
    info!(destination = %log.destination(), model = %config.llm.model, "pipeline ready");

    Ok(Pipeline::new(client, log))
}

/// Run the single-lead flow and handle the optional mail actions.
#[allow(clippy::too_many_arguments)]
async fn handle_generate(
    pipeline: &Pipeline,
    config: &OutreachConfig,
    credentials: &Credentials,
    lead: Lead,
    sender: SenderProfile,
    pdf_path: Option<&Path>,
    send_mail: bool,
    mailto: bool,
) -> anyhow::Result<()> {
    let contact = lead.contact.clone();
    let request = outreach::types::OutreachRequest {
        lead,
        sender,
        kind: outreach::types::OutreachKind::Initial,
        prior_body: None,
    };
    let outcome = pipeline.run_single(request, pdf_path.is_some()).await?;

    println!("{}", outcome.email.body);
    report_log_outcome(&outcome.log_outcome);

    if let (Some(path), Some(pdf)) = (pdf_path, &outcome.pdf) {
        std::fs::write(path, pdf)
            .with_context(|| format!("failed to write PDF to {}", path.display()))?;
        info!(path = %path.display(), "PDF written");
    }

    // Mail actions require a well-formed email contact; generation and
    // logging above already succeeded regardless.
    if send_mail || mailto {
        let subject = outcome.email.subject_or("B2B Outreach");
        let message = MailMessage::prepare(&contact, subject, &outcome.email.body)?;
        if mailto {
            println!("{}", message.mailto_link());
        }
        if send_mail {
            let mailer = GraphMailer::new(
                &config.mail.api_base,
                config.mail.sender_address.clone(),
                credentials.get(GRAPH_ACCESS_TOKEN).map(str::to_owned),
                config.llm.request_timeout_secs,
            )?;
            mailer.send(&message).await?;
        }
    }

    Ok(())
}

/// Run the lead-table flow and write the requested artifacts.
async fn handle_bulk(
    pipeline: &Pipeline,
    input: &Path,
    sender: SenderProfile,
    bundle_path: Option<&Path>,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let file = std::fs::File::open(input)
        .with_context(|| format!("failed to open lead table {}", input.display()))?;
    let leads = parse_lead_table(file)?;
    info!(rows = leads.len(), "lead table parsed");

    let run = pipeline.run_batch(leads, &sender).await?;

    let total = run.items.len();
    let errors = run.error_count();
    info!(total, errors, ok = total.saturating_sub(errors), "bulk generation finished");
    for item in run.items.iter().filter(|i| i.error.is_some()) {
        warn!(
            row = item.index,
            contact = %item.lead.contact,
            error = item.error.as_deref().unwrap_or(""),
            "row failed"
        );
    }

    match (bundle_path, &run.bundle) {
        (Some(path), Some(bundle)) => {
            std::fs::write(path, bundle)
                .with_context(|| format!("failed to write bundle to {}", path.display()))?;
            info!(path = %path.display(), "bundle written");
        }
        (Some(_), None) => warn!("no PDFs were produced; bundle not written"),
        _ => {}
    }

    let report = run.report_csv()?;
    match report_path {
        Some(path) => {
            std::fs::write(path, &report)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => print!("{}", String::from_utf8_lossy(&report)),
    }

    Ok(())
}

/// Run the follow-up flow.
async fn handle_follow_up(
    pipeline: &Pipeline,
    lead: Lead,
    sender: SenderProfile,
    prior_body_path: Option<&Path>,
    pdf_path: Option<&Path>,
) -> anyhow::Result<()> {
    let prior_body = match prior_body_path {
        Some(path) => Some(std::fs::read_to_string(path).with_context(|| {
            format!("failed to read prior body from {}", path.display())
        })?),
        None => None,
    };

    let outcome = pipeline
        .run_follow_up(lead, sender, prior_body, pdf_path.is_some())
        .await?;

    println!("{}", outcome.email.body);
    report_log_outcome(&outcome.log_outcome);

    if let (Some(path), Some(pdf)) = (pdf_path, &outcome.pdf) {
        std::fs::write(path, pdf)
            .with_context(|| format!("failed to write PDF to {}", path.display()))?;
        info!(path = %path.display(), "PDF written");
    }

    Ok(())
}

/// Surface the log outcome on stderr; a failure is a warning, never fatal.
fn report_log_outcome(outcome: &LogOutcome) {
    match outcome {
        LogOutcome::Logged => info!("outreach record logged"),
        LogOutcome::Failed(reason) => warn!(reason, "email generated but not logged"),
    }
}
