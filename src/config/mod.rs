//! Configuration loading and management.
//!
//! Loads configuration from `./outreach.toml` (or `$OUTREACH_CONFIG_PATH`).
//! Environment variables override file values; file values override
//! defaults. A missing file is not an error — defaults apply.
//!
//! Credentials never live here; they come from the credential source
//! ([`crate::credentials`]) and are passed into constructors explicitly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::providers::CompletionConfig;
use crate::types::SenderProfile;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutreachConfig {
    /// Completion provider settings (`[llm]`).
    pub llm: LlmSettings,
    /// Operator identity defaults (`[sender]`).
    pub sender: SenderSettings,
    /// Outreach log destination (`[log]`).
    pub log: LogSettings,
    /// Mail dispatch settings (`[mail]`).
    pub mail: MailSettings,
}

/// Completion provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Sampling temperature, validated into [0, 2].
    pub temperature: f32,
    /// Maximum output tokens; truncation happens provider-side.
    pub max_tokens: u32,
    /// Chat completions endpoint.
    pub base_url: String,
    /// Request timeout in seconds, applied to every outbound call.
    pub request_timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_owned(),
            temperature: 0.7,
            max_tokens: 600,
            base_url: "https://api.openai.com/v1/chat/completions".to_owned(),
            request_timeout_secs: 30,
        }
    }
}

/// Operator identity defaults, overridable per request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SenderSettings {
    /// Sender's name.
    pub name: String,
    /// Sender's position.
    pub position: String,
    /// Sender's company name.
    pub company: String,
    /// Sender's contact info.
    pub contact_info: String,
}

impl SenderSettings {
    /// Materialize the process-wide default sender profile.
    pub fn profile(&self) -> SenderProfile {
        SenderProfile {
            name: self.name.clone(),
            position: self.position.clone(),
            company: self.company.clone(),
            contact_info: self.contact_info.clone(),
        }
    }
}

/// Which log destination to append to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogBackend {
    /// Local CSV file.
    Csv,
    /// Spreadsheet over the values REST API.
    Sheet,
}

/// Outreach log destination settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Backend selector.
    pub backend: LogBackend,
    /// Spreadsheet id (sheet backend).
    pub spreadsheet_id: String,
    /// Sheet/tab name (sheet backend).
    pub sheet_name: String,
    /// CSV file path (csv backend).
    pub csv_path: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            backend: LogBackend::Csv,
            spreadsheet_id: String::new(),
            sheet_name: "Sheet1".to_owned(),
            csv_path: "outreach_log.csv".to_owned(),
        }
    }
}

/// Mail dispatch settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Mailbox the mail API sends from.
    pub sender_address: String,
    /// Graph-style API base.
    pub api_base: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            sender_address: String::new(),
            api_base: "https://graph.microsoft.com/v1.0".to_owned(),
        }
    }
}

impl OutreachConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if a
    /// loaded value fails validation.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: OutreachConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config file found, using defaults");
                Ok(OutreachConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        if let Some(p) = env("OUTREACH_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("outreach.toml")
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("OUTREACH_MODEL") {
            self.llm.model = v;
        }
        if let Some(v) = env("OUTREACH_TEMPERATURE") {
            match v.parse() {
                Ok(n) => self.llm.temperature = n,
                Err(_) => tracing::warn!(
                    var = "OUTREACH_TEMPERATURE",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("OUTREACH_MAX_TOKENS") {
            match v.parse() {
                Ok(n) => self.llm.max_tokens = n,
                Err(_) => tracing::warn!(
                    var = "OUTREACH_MAX_TOKENS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("OUTREACH_TIMEOUT_SECS") {
            match v.parse() {
                Ok(n) => self.llm.request_timeout_secs = n,
                Err(_) => tracing::warn!(
                    var = "OUTREACH_TIMEOUT_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("OUTREACH_LOG_BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "csv" => self.log.backend = LogBackend::Csv,
                "sheet" => self.log.backend = LogBackend::Sheet,
                _ => tracing::warn!(
                    var = "OUTREACH_LOG_BACKEND",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("OUTREACH_SPREADSHEET_ID") {
            self.log.spreadsheet_id = v;
        }
        if let Some(v) = env("OUTREACH_SHEET_NAME") {
            self.log.sheet_name = v;
        }
        if let Some(v) = env("OUTREACH_CSV_PATH") {
            self.log.csv_path = v;
        }
        if let Some(v) = env("OUTREACH_MAIL_SENDER") {
            self.mail.sender_address = v;
        }
    }

    /// Range checks on loaded values.
    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!(
                "llm.temperature must be within [0, 2], got {}",
                self.llm.temperature
            );
        }
        Ok(())
    }

    /// Provider-independent completion settings for client construction.
    pub fn completion(&self) -> CompletionConfig {
        CompletionConfig {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            base_url: self.llm.base_url.clone(),
            request_timeout_secs: self.llm.request_timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_key: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_are_sane() {
        let config = OutreachConfig::default();
        assert_eq!(config.llm.model, "gpt-4");
        assert_eq!(config.log.backend, LogBackend::Csv);
        assert_eq!(config.log.sheet_name, "Sheet1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_fields_deserialize() {
        let toml = r#"
            [llm]
            model = "gpt-4o-mini"
            temperature = 0.4

            [sender]
            name = "F. Kahts"
            position = "Director"

            [log]
            backend = "sheet"
            spreadsheet_id = "abc123"
        "#;
        let config: OutreachConfig = toml::from_str(toml).expect("parses");
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 600, "unset fields keep defaults");
        assert_eq!(config.sender.name, "F. Kahts");
        assert_eq!(config.log.backend, LogBackend::Sheet);
        assert_eq!(config.log.spreadsheet_id, "abc123");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = OutreachConfig::default();
        config.apply_overrides(|key| match key {
            "OUTREACH_MODEL" => Some("gpt-4-turbo".to_owned()),
            "OUTREACH_TEMPERATURE" => Some("1.5".to_owned()),
            "OUTREACH_LOG_BACKEND" => Some("sheet".to_owned()),
            _ => None,
        });
        assert_eq!(config.llm.model, "gpt-4-turbo");
        assert!((config.llm.temperature - 1.5).abs() < f32::EPSILON);
        assert_eq!(config.log.backend, LogBackend::Sheet);
    }

    #[test]
    fn invalid_env_overrides_are_ignored() {
        let mut config = OutreachConfig::default();
        config.apply_overrides(|key| match key {
            "OUTREACH_TEMPERATURE" => Some("warm".to_owned()),
            "OUTREACH_LOG_BACKEND" => Some("stone-tablet".to_owned()),
            _ => None,
        });
        assert!((config.llm.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.log.backend, LogBackend::Csv);
    }

    #[test]
    fn out_of_range_temperature_fails_validation() {
        let mut config = OutreachConfig::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());
        config.llm.temperature = -0.1;
        assert!(config.validate().is_err());
        config.llm.temperature = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_path_prefers_env() {
        let path = OutreachConfig::config_path_with(|key| {
            (key == "OUTREACH_CONFIG_PATH").then(|| "/tmp/custom.toml".to_owned())
        });
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
        assert_eq!(
            OutreachConfig::config_path_with(no_env),
            PathBuf::from("outreach.toml")
        );
    }
}
