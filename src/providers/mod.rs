//! Completion provider abstraction layer.
//!
//! Defines the [`CompletionClient`] trait and the shared configuration and
//! error types used by provider implementations. One provider is
//! implemented: [`openai::OpenAiClient`] against the chat completions API.
//!
//! Contract highlights:
//! - a missing/empty credential is reported as [`CompletionError::Auth`]
//!   *before* any network call is attempted;
//! - exactly one outbound call per invocation — no retries, no caching, no
//!   deduplication of identical prompts;
//! - request timeout is explicit configuration, and a timeout surfaces as
//!   the transport error kind.

use async_trait::async_trait;
use regex::Regex;

pub mod openai;

/// Provider-independent completion settings.
///
/// Carried by value into client constructors; there is no ambient
/// session-held credential anywhere in this crate.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// Model identifier sent verbatim to the provider.
    pub model: String,
    /// Sampling temperature. Valid range [0, 2]; enforced at config load.
    pub temperature: f32,
    /// Maximum output tokens. Truncation happens at the provider, never
    /// locally.
    pub max_tokens: u32,
    /// Chat completions endpoint URL.
    pub base_url: String,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

/// Errors returned by completion providers.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// Credential missing or rejected. Checked locally before any network
    /// call when the credential is absent.
    #[error("completion credential missing or rejected: {0}")]
    Auth(String),
    /// Provider reported a failure; status and message surfaced verbatim.
    #[error("completion provider returned status {status}: {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Provider-reported message (redacted and truncated).
        message: String,
    },
    /// HTTP transport failure, including configured-timeout expiry.
    #[error("completion transport error: {0}")]
    Network(#[from] reqwest::Error),
    /// Response did not match the expected schema.
    #[error("completion response parse error: {0}")]
    Parse(String),
}

/// Core completion interface.
///
/// Implementations must be `Send + Sync` so the pipeline can hold them
/// behind an `Arc<dyn CompletionClient>`.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Request one completion for `prompt` and return the trimmed message
    /// text of the first choice.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError`] on credential, provider, transport, or
    /// parse failure. Never retried here; batch callers isolate the failure
    /// to the current item.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// The model identifier this client is instantiated for.
    fn model_id(&self) -> &str;
}

/// Check HTTP response status and return body text or a structured error.
///
/// 401/403 map to [`CompletionError::Auth`]; other non-2xx statuses map to
/// [`CompletionError::Remote`] with a redacted body.
///
/// # Errors
///
/// Returns `CompletionError::Network` when the body cannot be read.
pub(crate) async fn check_http_response(
    response: reqwest::Response,
) -> Result<String, CompletionError> {
    let status = response.status();
    let body = response.text().await?;
    if status.as_u16() == 401 || status.as_u16() == 403 {
        return Err(CompletionError::Auth(format!(
            "provider rejected credential (status {}): {}",
            status.as_u16(),
            sanitize_http_error_body(&body)
        )));
    }
    if !status.is_success() {
        return Err(CompletionError::Remote {
            status: status.as_u16(),
            message: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact anything that looks like an API key, and
/// truncate so a provider error body never floods the caller's output.
fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [r"sk-[A-Za-z0-9_\-]{20,}", r"Bearer [A-Za-z0-9._\-]{16,}"] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}
