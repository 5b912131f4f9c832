//! Prompt construction for outreach generation.
//!
//! One parameterized builder replaces the per-variant prompt literals the
//! tool historically accumulated. Template selection is purely a function of
//! [`OutreachKind`]; no other state is consulted.
//!
//! [`build_prompt`] is pure and total: it never fails, and an empty or
//! whitespace-only field renders as the literal `"N/A"` rather than leaving
//! a hole in the template.

use crate::types::{OutreachKind, OutreachRequest};

/// Placeholder substituted for empty optional fields.
const MISSING_FIELD: &str = "N/A";

/// Fixed description of the operator's offerings, included verbatim in every
/// initial prompt.
const OFFERINGS: &str = "We supply industrial equipment, spare parts, and procurement services \
     to operations in mining, construction, agriculture, and healthcare, \
     with a focus on fast quoting and reliable cross-border delivery.";

/// Tone directives appended to the initial template.
const TONE: &str = "Keep the email concise (under 180 words), professional, and warm. \
     Open with something specific to the recipient, state one clear value \
     proposition, and close with a low-pressure call to action. \
     Start the email with a 'Subject:' line.";

fn field(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        MISSING_FIELD
    } else {
        trimmed
    }
}

fn opt_field(value: Option<&str>) -> &str {
    field(value.unwrap_or(""))
}

/// Build the completion prompt for a request.
pub fn build_prompt(request: &OutreachRequest) -> String {
    match request.kind {
        OutreachKind::Initial => initial_prompt(request),
        OutreachKind::FollowUp => follow_up_prompt(request),
    }
}

fn initial_prompt(request: &OutreachRequest) -> String {
    let lead = &request.lead;
    let sender = &request.sender;
    format!(
        "Write a concise B2B outreach email to the following prospect.\n\
         \n\
         Prospect:\n\
         - Name: {name}\n\
         - Job title: {job_title}\n\
         - Company: {company}\n\
         - Industry: {industry}\n\
         - Recent activity: {recent_activity}\n\
         \n\
         About us: {offerings}\n\
         \n\
         {tone}\n\
         \n\
         Sign off with this signature block:\n\
         {sender_name}\n\
         {sender_position}, {sender_company}\n\
         {sender_contact}",
        name = field(&lead.name),
        job_title = field(&lead.job_title),
        company = field(&lead.company),
        industry = field(&lead.industry),
        recent_activity = opt_field(lead.recent_activity.as_deref()),
        offerings = OFFERINGS,
        tone = TONE,
        sender_name = field(&sender.name),
        sender_position = field(&sender.position),
        sender_company = field(&sender.company),
        sender_contact = field(&sender.contact_info),
    )
}

fn follow_up_prompt(request: &OutreachRequest) -> String {
    match request.prior_body.as_deref().map(str::trim) {
        Some(prior) if !prior.is_empty() => format!(
            "Write a polite, brief follow-up to this outreach email. \
             Reference its content without repeating it, and nudge for a reply \
             without pressure.\n\n{prior}"
        ),
        _ => {
            let lead = &request.lead;
            format!(
                "Write a polite, brief follow-up email to {name} at {company} \
                 (a {industry} prospect) about our earlier outreach. \
                 Nudge for a reply without pressure.",
                name = field(&lead.name),
                company = field(&lead.company),
                industry = field(&lead.industry),
            )
        }
    }
}
