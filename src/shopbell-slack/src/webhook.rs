//! Outbound delivery to Slack incoming webhooks.
//!
//! One POST per notification. No retries: a non-success status or a network
//! failure is logged and reported as [`DeliveryOutcome::Failed`].

use std::time::Duration;

use tracing::{debug, error};
use url::Url;

use crate::error::{SlackError, SlackResult};
use crate::messages::WebhookMessage;

/// Longest response body excerpt kept in errors and logs.
const MAX_ERROR_BODY: usize = 512;

/// Client behavior.
#[derive(Debug, Clone)]
pub struct WebhookOptions {
    /// Deadline for the whole request, including reading the response.
    pub timeout: Duration,
    /// Deadline for establishing the connection.
    pub connect_timeout: Duration,
}

impl Default for WebhookOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The destination answered 2xx.
    Delivered { status: u16 },
    /// Non-success status (`status` set) or network failure (`status` unset).
    Failed { status: Option<u16>, error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// HTTP client for incoming webhooks.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
}

impl WebhookClient {
    /// Create a client with the given options.
    pub fn new(options: WebhookOptions) -> SlackResult<Self> {
        if options.timeout.is_zero() {
            return Err(SlackError::Config(
                "Delivery timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(options.connect_timeout)
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SlackError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// POST a message, returning the HTTP status on success.
    ///
    /// # Errors
    ///
    /// [`SlackError::Http`] for non-2xx answers, [`SlackError::Timeout`] or
    /// [`SlackError::Network`] when no answer arrived.
    pub async fn send(&self, url: &str, message: &WebhookMessage) -> SlackResult<u16> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(status.as_u16());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut end = MAX_ERROR_BODY;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }
        Err(SlackError::Http {
            status: status.as_u16(),
            body,
        })
    }

    /// Deliver `text` to `url` once and report what happened.
    ///
    /// Never returns an error; failures are logged here and surfaced through
    /// the outcome.
    pub async fn deliver(&self, url: &str, text: &str) -> DeliveryOutcome {
        let destination = redact_url(url);
        match self.send(url, &WebhookMessage::new(text)).await {
            Ok(status) => {
                debug!(%destination, status, "Webhook delivered");
                DeliveryOutcome::Delivered { status }
            }
            Err(e) => {
                error!(%destination, status = ?e.http_status(), error = %e, "Webhook delivery failed");
                DeliveryOutcome::Failed {
                    status: e.http_status(),
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Render a URL for logs without its path or query.
///
/// Slack webhook URLs carry their secret in the path.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match (parsed.host_str(), parsed.port()) {
            (Some(host), Some(port)) => format!("{}://{}:{}/[REDACTED]", parsed.scheme(), host, port),
            (Some(host), None) => format!("{}://{}/[REDACTED]", parsed.scheme(), host),
            _ => "[REDACTED]".to_string(),
        },
        Err(_) => "[REDACTED]".to_string(),
    }
}
