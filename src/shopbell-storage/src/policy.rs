//! Validation rules applied before anything is persisted.

use url::Url;

use crate::error::{Result, StorageError};

/// Prefix every Slack incoming-webhook URL starts with.
pub const SLACK_WEBHOOK_PREFIX: &str = "https://hooks.slack.com/";

/// Maximum accepted tenant id length.
const MAX_TENANT_ID_LEN: usize = 255;

/// Which destination URLs may be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookUrlPolicy {
    /// Accepted URL prefixes. An empty list accepts any `http`/`https` URL.
    allowed_prefixes: Vec<String>,
}

impl WebhookUrlPolicy {
    /// Only Slack incoming webhooks.
    pub fn slack() -> Self {
        Self::with_prefixes([SLACK_WEBHOOK_PREFIX])
    }

    /// Accept URLs starting with any of the given prefixes.
    pub fn with_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_prefixes: prefixes
                .into_iter()
                .map(Into::into)
                .filter(|p: &String| !p.trim().is_empty())
                .collect(),
        }
    }

    /// Accept any absolute `http`/`https` URL.
    pub fn any_http() -> Self {
        Self {
            allowed_prefixes: Vec::new(),
        }
    }

    pub fn allowed_prefixes(&self) -> &[String] {
        &self.allowed_prefixes
    }

    /// Validate a candidate URL, returning the trimmed form to persist.
    pub fn validate(&self, candidate: &str) -> Result<String> {
        let trimmed = candidate.trim();
        if trimmed.is_empty() {
            return Err(StorageError::InvalidWebhookUrl(
                "URL must not be empty".to_string(),
            ));
        }

        let parsed = Url::parse(trimmed)
            .map_err(|e| StorageError::InvalidWebhookUrl(format!("{trimmed}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(StorageError::InvalidWebhookUrl(format!(
                "{trimmed}: expected an http(s) URL with a host"
            )));
        }

        if !self.allowed_prefixes.is_empty()
            && !self
                .allowed_prefixes
                .iter()
                .any(|prefix| trimmed.starts_with(prefix.as_str()))
        {
            return Err(StorageError::InvalidWebhookUrl(format!(
                "{trimmed}: must start with one of {:?}",
                self.allowed_prefixes
            )));
        }

        Ok(trimmed.to_string())
    }
}

impl Default for WebhookUrlPolicy {
    fn default() -> Self {
        Self::slack()
    }
}

/// Check that a tenant id is safe to use as a storage key and file name.
///
/// Shop domains such as `shop-a.myshopify.com` pass; anything with path
/// separators, whitespace or a leading dot does not.
pub fn validate_tenant_id(tenant_id: &str) -> Result<()> {
    let valid = !tenant_id.is_empty()
        && tenant_id.len() <= MAX_TENANT_ID_LEN
        && !tenant_id.starts_with('.')
        && tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'));

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidTenant(tenant_id.to_string()))
    }
}
