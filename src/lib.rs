//! Outreach — a B2B outreach email generator.
//!
//! Given lead metadata, composes a prompt, requests a completion from a
//! hosted LLM, renders the result as text/PDF, and appends a record to an
//! append-only log (spreadsheet or CSV). Bulk mode repeats the pipeline
//! over a lead table; follow-up mode re-enters it referencing a previous
//! body.
//!
//! See `DESIGN.md` for architecture notes and policy decisions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod leads;
pub mod logging;
pub mod mail;
pub mod pipeline;
pub mod prompt;
pub mod providers;
pub mod render;
pub mod sanitize;
pub mod sinks;
pub mod types;
