//! Error types for shopbell-storage.

use thiserror::Error;

/// Storage error types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Tenant identifier is empty or contains characters outside the allowed set.
    #[error("Invalid tenant id: {0:?}")]
    InvalidTenant(String),

    /// Webhook URL rejected by the configured policy.
    #[error("Invalid webhook URL: {0}")]
    InvalidWebhookUrl(String),
}

impl StorageError {
    /// Whether the error was caused by caller input rather than the backend.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidTenant(_) | Self::InvalidWebhookUrl(_))
    }
}

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
