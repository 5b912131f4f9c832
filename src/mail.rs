//! Mail-send collaborator: payload preparation and optional dispatch.
//!
//! This crate only prepares the payload — either a Graph-shaped `sendMail`
//! request dispatched with the operator's token, or a `mailto:` deep link
//! for the local client. Delivery is never guaranteed here.
//!
//! A well-formed email address is required for these actions only.
//! Generation and logging accept any non-empty contact string (a phone
//! number is fine); the recipient check lives here, at the mail boundary.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::info;
use url::form_urlencoded;

/// Errors from mail payload preparation or dispatch.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// The recipient contact is not a well-formed email address.
    #[error("recipient is not a well-formed email address: {0:?}")]
    InvalidRecipient(String),
    /// Credential missing or rejected by the mail API.
    #[error("mail credential missing or rejected: {0}")]
    Auth(String),
    /// The mail API refused the send request.
    #[error("mail dispatch rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body excerpt.
        message: String,
    },
    /// HTTP transport failure.
    #[error("mail transport error: {0}")]
    Network(#[from] reqwest::Error),
}

static EMAIL_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok());

/// Whether `contact` looks like an email address.
///
/// Intentionally shallow: one `@`, a dotted domain, no whitespace. Anything
/// stricter rejects real addresses; anything looser accepts phone numbers.
pub fn is_email_address(contact: &str) -> bool {
    EMAIL_SHAPE
        .as_ref()
        .is_some_and(|re| re.is_match(contact.trim()))
}

/// A prepared outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl MailMessage {
    /// Prepare a message, validating the recipient.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::InvalidRecipient`] for non-email contacts.
    pub fn prepare(to: &str, subject: &str, body: &str) -> Result<Self, MailError> {
        if !is_email_address(to) {
            return Err(MailError::InvalidRecipient(to.to_owned()));
        }
        Ok(Self {
            to: to.trim().to_owned(),
            subject: subject.to_owned(),
            body: body.to_owned(),
        })
    }

    /// Render a `mailto:` deep link for the local mail client.
    pub fn mailto_link(&self) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("subject", &self.subject)
            .append_pair("body", &self.body)
            .finish();
        format!("mailto:{}?{}", self.to, query)
    }
}

/// Graph-style authenticated mail dispatcher.
///
/// Sends `{message: {subject, body, toRecipients}, saveToSentItems}` to the
/// configured `sendMail` endpoint and treats HTTP 202 as accepted.
pub struct GraphMailer {
    endpoint: String,
    sender_address: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GraphMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphMailer")
            .field("endpoint", &self.endpoint)
            .field("sender_address", &self.sender_address)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GraphMailer {
    /// Create a mailer for `sender_address` against a Graph-style API base
    /// (e.g. `https://graph.microsoft.com/v1.0`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_base: &str,
        sender_address: String,
        token: Option<String>,
        request_timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()?;
        Ok(Self {
            endpoint: format!(
                "{}/users/{sender_address}/sendMail",
                api_base.trim_end_matches('/')
            ),
            sender_address,
            token: token.filter(|t| !t.trim().is_empty()),
            client,
        })
    }

    /// Dispatch a prepared message.
    ///
    /// # Errors
    ///
    /// Returns [`MailError::Auth`] when no token is configured or the API
    /// rejects it, [`MailError::Rejected`] on any other non-accept status.
    pub async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| MailError::Auth("no mail token configured".to_owned()))?;

        let payload = serde_json::json!({
            "message": {
                "subject": message.subject,
                "body": { "contentType": "Text", "content": message.body },
                "toRecipients": [ { "emailAddress": { "address": message.to } } ],
            },
            "saveToSentItems": "true",
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(MailError::Auth(format!(
                "mail API rejected token (status {})",
                status.as_u16()
            )));
        }
        if status.as_u16() != 202 && !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                message: text.chars().take(256).collect(),
            });
        }

        info!(to = %message.to, from = %self.sender_address, "mail accepted for delivery");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_addresses_validate() {
        assert!(is_email_address("jane@acme.test"));
        assert!(is_email_address("  f.kahts+sales@qicp.co.za "));
    }

    #[test]
    fn phone_numbers_do_not_validate() {
        assert!(!is_email_address("+27 73 163 1077"));
        assert!(!is_email_address("0731631077"));
    }

    #[test]
    fn degenerate_strings_do_not_validate() {
        assert!(!is_email_address(""));
        assert!(!is_email_address("jane@acme"));
        assert!(!is_email_address("jane acme@x.test"));
        assert!(!is_email_address("@acme.test"));
    }

    #[test]
    fn prepare_rejects_phone_contact() {
        let err = MailMessage::prepare("+27 73 163 1077", "s", "b").expect_err("must fail");
        assert!(matches!(err, MailError::InvalidRecipient(_)));
    }

    #[test]
    fn mailto_link_percent_encodes() {
        let message = MailMessage::prepare("jane@acme.test", "B2B Outreach", "Dear Jane,\nHello & welcome.")
            .expect("valid recipient");
        let link = message.mailto_link();
        assert!(link.starts_with("mailto:jane@acme.test?"));
        assert!(link.contains("subject=B2B+Outreach"));
        assert!(!link.contains('\n'));
        assert!(!link.contains(" & "));
    }

    #[tokio::test]
    async fn send_without_token_fails_before_network() {
        let mailer = GraphMailer::new(
            "https://graph.microsoft.com/v1.0",
            "f@qicp.test".to_owned(),
            None,
            5,
        )
        .expect("client builds");
        let message = MailMessage::prepare("jane@acme.test", "s", "b").expect("valid");
        let err = mailer.send(&message).await.expect_err("must fail");
        assert!(matches!(err, MailError::Auth(_)));
    }

    #[test]
    fn endpoint_targets_the_sender_mailbox() {
        let mailer = GraphMailer::new(
            "https://graph.microsoft.com/v1.0/",
            "f@qicp.test".to_owned(),
            Some("t".to_owned()),
            5,
        )
        .expect("client builds");
        assert_eq!(
            mailer.endpoint,
            "https://graph.microsoft.com/v1.0/users/f@qicp.test/sendMail"
        );
    }
}
