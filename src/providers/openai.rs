//! Chat completions client for the OpenAI `/v1/chat/completions` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_http_response, CompletionClient, CompletionConfig, CompletionError};

// ---------------------------------------------------------------------------
// Wire types (pub(crate) for integration testing)
// ---------------------------------------------------------------------------

/// Chat completions API request body.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages; always a single user message here.
    pub messages: Vec<OpenAiMessage>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum completion tokens.
    pub max_tokens: u32,
}

/// A message in chat format.
#[doc(hidden)]
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    /// Role (`user` for outreach prompts).
    pub role: String,
    /// Plain text content.
    pub content: String,
}

/// Chat completions API response body.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponse {
    /// Response choices.
    pub choices: Vec<OpenAiChoice>,
}

/// A response choice.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiChoice {
    /// Assistant message for this choice.
    pub message: OpenAiResponseMessage,
}

/// Assistant message payload.
#[doc(hidden)]
#[derive(Debug, Deserialize)]
pub struct OpenAiResponseMessage {
    /// Text content.
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Chat completions client holding its configuration and credential
/// explicitly — no ambient state.
pub struct OpenAiClient {
    config: CompletionConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("config", &self.config)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client with an explicit credential.
    ///
    /// A `None` or empty credential is accepted here and reported as
    /// [`CompletionError::Auth`] on the first `complete` call, before any
    /// network I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: CompletionConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            config,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }
}

/// Build the request body for a single-prompt completion.
#[doc(hidden)]
pub fn build_request(config: &CompletionConfig, prompt: &str) -> OpenAiRequest {
    OpenAiRequest {
        model: config.model.clone(),
        messages: vec![OpenAiMessage {
            role: "user".to_owned(),
            content: prompt.to_owned(),
        }],
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    }
}

/// Parse a response body into the trimmed text of the first choice.
///
/// # Errors
///
/// Returns `CompletionError::Parse` if the body does not deserialize or
/// `choices[0].message.content` is absent.
#[doc(hidden)]
pub fn parse_response(body: &str) -> Result<String, CompletionError> {
    let resp: OpenAiResponse =
        serde_json::from_str(body).map_err(|e| CompletionError::Parse(e.to_string()))?;

    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| CompletionError::Parse("missing choices[0]".to_owned()))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| CompletionError::Parse("missing choices[0].message.content".to_owned()))?;

    Ok(content.trim().to_owned())
}

#[async_trait::async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        // Credential pre-check: fail before touching the network.
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Auth("no API key configured".to_owned()))?;

        let api_request = build_request(&self.config, prompt);
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(&self.config.base_url)
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {api_key}"))
            .json(&api_request)
            .send()
            .await?;

        let payload = check_http_response(response).await?;
        parse_response(&payload)
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CompletionConfig {
        CompletionConfig {
            model: "gpt-4".to_owned(),
            temperature: 0.7,
            max_tokens: 600,
            base_url: "https://api.openai.com/v1/chat/completions".to_owned(),
            request_timeout_secs: 30,
        }
    }

    #[test]
    fn request_carries_single_user_message() {
        let request = build_request(&config(), "Write an email.");
        assert_eq!(request.model, "gpt-4");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.messages[0].content, "Write an email.");
        assert_eq!(request.max_tokens, 600);
    }

    #[test]
    fn response_parses_first_choice_trimmed() {
        let body = r#"{"choices":[{"message":{"content":"  Dear Jane, ...  \n"}}]}"#;
        assert_eq!(parse_response(body).expect("parses"), "Dear Jane, ...");
    }

    #[test]
    fn empty_choices_is_a_parse_error() {
        let err = parse_response(r#"{"choices":[]}"#).expect_err("must fail");
        assert!(matches!(err, CompletionError::Parse(_)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_response("not json").expect_err("must fail");
        assert!(matches!(err, CompletionError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_network() {
        // Unroutable base_url: if the pre-check were skipped this would hang
        // or surface a transport error instead of Auth.
        let mut cfg = config();
        cfg.base_url = "http://127.0.0.1:1/v1/chat/completions".to_owned();
        let client = OpenAiClient::new(cfg, None).expect("client builds");
        let err = client.complete("hi").await.expect_err("must fail");
        assert!(matches!(err, CompletionError::Auth(_)), "got: {err}");
    }
}
