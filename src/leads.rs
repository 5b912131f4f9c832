//! Lead table parsing for bulk mode.
//!
//! Accepts a CSV upload whose columns are named after [`Lead`] attributes.
//! Header matching is case-insensitive and tolerant of the common aliases
//! (`Sector` for industry, `Job Title` for job_title). At minimum an
//! industry/sector column and a contact column must be present; anything
//! missing is a caller-visible validation error, not a pipeline error.

use std::io::Read;

use crate::types::Lead;

/// Malformed or missing required input, detected before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The lead has no contact string at all.
    #[error("lead contact is required")]
    MissingContact,
    /// The uploaded table lacks required columns.
    #[error("lead table is missing required columns: {0}")]
    MissingColumns(String),
    /// The uploaded table could not be parsed at all.
    #[error("lead table is malformed: {0}")]
    Malformed(String),
}

/// Column positions resolved from the header row.
#[derive(Debug, Default)]
struct ColumnMap {
    name: Option<usize>,
    job_title: Option<usize>,
    company: Option<usize>,
    industry: Option<usize>,
    recent_activity: Option<usize>,
    contact: Option<usize>,
}

impl ColumnMap {
    fn resolve(headers: &csv::StringRecord) -> Self {
        let mut map = Self::default();
        for (index, raw) in headers.iter().enumerate() {
            let key = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
            match key.as_str() {
                "name" | "lead_name" | "full_name" => map.name = Some(index),
                "job_title" | "title" | "role" => map.job_title = Some(index),
                "company" | "company_name" => map.company = Some(index),
                "industry" | "sector" => map.industry = Some(index),
                "recent_activity" | "activity" | "notes" => map.recent_activity = Some(index),
                "contact" | "email" | "contact_info" => map.contact = Some(index),
                _ => {}
            }
        }
        map
    }

    fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.industry.is_none() {
            missing.push("industry/sector");
        }
        if self.contact.is_none() {
            missing.push("contact");
        }
        missing
    }
}

fn cell(record: &csv::StringRecord, index: Option<usize>) -> String {
    index
        .and_then(|i| record.get(i))
        .unwrap_or("")
        .trim()
        .to_owned()
}

/// Parse an uploaded lead table.
///
/// # Errors
///
/// Returns [`ValidationError::MissingColumns`] if required columns are
/// absent, or [`ValidationError::Malformed`] if the CSV cannot be read.
pub fn parse_lead_table(data: impl Read) -> Result<Vec<Lead>, ValidationError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| ValidationError::Malformed(e.to_string()))?
        .clone();
    let columns = ColumnMap::resolve(&headers);

    let missing = columns.missing_required();
    if !missing.is_empty() {
        return Err(ValidationError::MissingColumns(missing.join(", ")));
    }

    let mut leads = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ValidationError::Malformed(e.to_string()))?;
        let recent_activity = {
            let value = cell(&record, columns.recent_activity);
            if value.is_empty() {
                None
            } else {
                Some(value)
            }
        };
        leads.push(Lead {
            name: cell(&record, columns.name),
            job_title: cell(&record, columns.job_title),
            company: cell(&record, columns.company),
            industry: cell(&record, columns.industry),
            recent_activity,
            contact: cell(&record, columns.contact),
        });
    }
    Ok(leads)
}
