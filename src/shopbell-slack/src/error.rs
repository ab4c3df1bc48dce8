//! Error types for order parsing and Slack delivery.

use thiserror::Error;

/// Errors that can occur while parsing events or talking to Slack.
#[derive(Error, Debug)]
pub enum SlackError {
    /// Configuration error (invalid client options).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The destination answered with a non-success status.
    #[error("Webhook returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        body: String,
    },

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Invalid payload received from the commerce platform.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SlackError {
    /// HTTP status returned by the destination, if the failure carried one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SlackError {
    fn from(err: reqwest::Error) -> Self {
        // Drop the URL: Slack webhook URLs are credentials
        let err = err.without_url();
        if err.is_timeout() {
            SlackError::Timeout(err.to_string())
        } else if err.is_connect() {
            SlackError::Network(format!("Connection failed: {}", err))
        } else {
            SlackError::Network(err.to_string())
        }
    }
}

/// Result type for Slack operations.
pub type SlackResult<T> = std::result::Result<T, SlackError>;
