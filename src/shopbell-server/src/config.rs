//! Server configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use shopbell_slack::WebhookOptions;
use shopbell_storage::{SLACK_WEBHOOK_PREFIX, WebhookUrlPolicy};

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Settings storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound notification delivery.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2MB
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            storage: StorageConfig::default(),
            slack: SlackConfig::default(),
            logging: LoggingConfig::default(),
            max_body_size: default_max_body_size(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from `SHOPBELL_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("SHOPBELL_LISTEN_ADDR") {
            self.listen_addr = addr;
        }

        if let Some(backend) = lookup("SHOPBELL_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }

        if let Some(dir) = lookup("SHOPBELL_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }

        if let Some(secs) = lookup("SHOPBELL_DELIVERY_TIMEOUT_SECS") {
            self.slack.delivery_timeout_secs = secs.trim().parse::<u64>().map_err(|e| {
                anyhow::anyhow!("Invalid SHOPBELL_DELIVERY_TIMEOUT_SECS '{secs}': {e}")
            })?;
        }

        if let Some(prefixes) = lookup("SHOPBELL_ALLOWED_URL_PREFIXES") {
            self.slack.allowed_url_prefixes = prefixes
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        self.validate()
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.slack.delivery_timeout_secs == 0 {
            anyhow::bail!("slack.delivery_timeout_secs must be greater than zero");
        }
        if self.slack.allowed_url_prefixes.is_empty() {
            anyhow::bail!("slack.allowed_url_prefixes must not be empty");
        }
        if self.max_body_size == 0 {
            anyhow::bail!("max_body_size must be greater than zero");
        }
        Ok(())
    }

    /// Get shutdown timeout as Duration.
    pub fn shutdown_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

/// Which settings backend to run with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// In-process map, lost on restart.
    #[default]
    Memory,
    /// One JSON document per tenant under `data_dir`.
    File,
}

impl FromStr for StorageBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => anyhow::bail!("Unknown storage backend '{other}' (expected memory or file)"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,
    /// Root directory for the file backend.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            data_dir: default_data_dir(),
        }
    }
}

/// Outbound delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    /// Deadline for one delivery attempt in seconds.
    #[serde(default = "default_delivery_timeout")]
    pub delivery_timeout_secs: u64,
    /// Connection deadline in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Accepted destination URL prefixes.
    #[serde(default = "default_allowed_prefixes")]
    pub allowed_url_prefixes: Vec<String>,
}

fn default_delivery_timeout() -> u64 {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_allowed_prefixes() -> Vec<String> {
    vec![SLACK_WEBHOOK_PREFIX.to_string()]
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            delivery_timeout_secs: default_delivery_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            allowed_url_prefixes: default_allowed_prefixes(),
        }
    }
}

impl SlackConfig {
    pub fn webhook_options(&self) -> WebhookOptions {
        let timeout = Duration::from_secs(self.delivery_timeout_secs);
        WebhookOptions {
            timeout,
            // Never longer than the request deadline
            connect_timeout: Duration::from_secs(self.connect_timeout_secs).min(timeout),
        }
    }

    pub fn url_policy(&self) -> WebhookUrlPolicy {
        WebhookUrlPolicy::with_prefixes(self.allowed_url_prefixes.iter().cloned())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json or pretty).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}
