//! Credential loading from a runtime `.env` file.
//!
//! The credential source supplies opaque tokens for the completion
//! provider, the spreadsheet log, and the mail API. They are loaded once at
//! process start, passed into constructors by value, and never persisted or
//! echoed — `Debug` redacts all values.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Key for the completion provider API key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Key for the spreadsheet append token.
pub const SHEETS_ACCESS_TOKEN: &str = "SHEETS_ACCESS_TOKEN";
/// Key for the mail API token.
pub const GRAPH_ACCESS_TOKEN: &str = "GRAPH_ACCESS_TOKEN";

/// Runtime credentials loaded from the `.env` file.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Returns a required credential or an error when missing.
    ///
    /// # Errors
    ///
    /// Returns an error when the key does not exist in loaded credentials.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.get(key)
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("missing required credential: {key}"))
    }
}

/// Load credentials from a specific `.env` path.
///
/// A missing file yields empty credentials: every command that needs a
/// token reports the precise missing key at the point of use instead.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        debug!(path = %path.display(), "no credentials file; starting with none");
        return Ok(Credentials::default());
    }

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    Ok(Credentials { vars })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_keys_from_env_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).expect("creates");
        writeln!(file, "OPENAI_API_KEY=sk-test-123").expect("writes");
        writeln!(file, "SHEETS_ACCESS_TOKEN=ya29.token").expect("writes");

        let creds = load_credentials(&path).expect("loads");
        assert_eq!(creds.get(OPENAI_API_KEY), Some("sk-test-123"));
        assert_eq!(creds.require(SHEETS_ACCESS_TOKEN).expect("present"), "ya29.token");
    }

    #[test]
    fn missing_file_yields_empty_credentials() {
        let creds = load_credentials(Path::new("/nonexistent/.env")).expect("lenient");
        assert!(creds.get(OPENAI_API_KEY).is_none());
        assert!(creds.require(OPENAI_API_KEY).is_err());
    }

    #[test]
    fn empty_values_count_as_missing() {
        let creds = Credentials::from_map(BTreeMap::from([(
            OPENAI_API_KEY.to_owned(),
            "   ".to_owned(),
        )]));
        assert!(creds.get(OPENAI_API_KEY).is_none());
    }

    #[test]
    fn debug_redacts_values() {
        let creds = Credentials::from_map(BTreeMap::from([(
            OPENAI_API_KEY.to_owned(),
            "sk-secret".to_owned(),
        )]));
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
