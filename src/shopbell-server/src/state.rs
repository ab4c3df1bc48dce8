//! Application state management.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use shopbell_slack::WebhookClient;
use shopbell_storage::{ConfigStore, FileBackend, MemoryBackend, SettingsBackend};
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{ServerConfig, StorageBackendKind};
use crate::error::AppResult;
use crate::receiver::EventReceiver;

/// Counter names.
pub mod counters {
    pub const WEBHOOKS_RECEIVED: &str = "webhooks_received";
    pub const WEBHOOKS_IGNORED: &str = "webhooks_ignored";
    pub const WEBHOOKS_UNCONFIGURED: &str = "webhooks_unconfigured";
    pub const DELIVERIES_SUCCEEDED: &str = "deliveries_succeeded";
    pub const DELIVERIES_FAILED: &str = "deliveries_failed";
    pub const SETTINGS_UPDATED: &str = "settings_updated";
    pub const ERRORS: &str = "errors";
}

/// Application state shared across handlers.
pub struct AppState {
    /// Server configuration.
    pub config: ServerConfig,
    /// Per-tenant settings.
    pub store: Arc<ConfigStore>,
    /// Inbound event pipeline.
    pub receiver: EventReceiver,
    /// Metrics.
    metrics: RwLock<MetricsState>,
    /// Start time.
    start_time: Instant,
}

impl AppState {
    /// Create state from configuration, opening the configured backend.
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        let backend: Arc<dyn SettingsBackend> = match config.storage.backend {
            StorageBackendKind::Memory => Arc::new(MemoryBackend::new()),
            StorageBackendKind::File => {
                Arc::new(FileBackend::open(&config.storage.data_dir).await?)
            }
        };
        let store = Arc::new(ConfigStore::new(backend, config.slack.url_policy()));
        let client = WebhookClient::new(config.slack.webhook_options())?;

        info!(
            backend = store.backend_name(),
            durable = store.is_durable(),
            "Settings store ready"
        );

        Ok(Self::with_components(config, store, client))
    }

    /// Create state around an existing store and client.
    pub fn with_components(
        config: ServerConfig,
        store: Arc<ConfigStore>,
        client: WebhookClient,
    ) -> Self {
        Self {
            receiver: EventReceiver::new(store.clone(), client),
            config,
            store,
            metrics: RwLock::new(MetricsState::default()),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Increment a counter metric.
    pub async fn increment_counter(&self, name: &str) {
        let mut metrics = self.metrics.write().await;
        *metrics.counters.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Current value of a counter.
    pub async fn counter(&self, name: &str) -> u64 {
        self.metrics
            .read()
            .await
            .counters
            .get(name)
            .copied()
            .unwrap_or(0)
    }

    /// Get metrics snapshot.
    pub async fn get_metrics(&self) -> MetricsSnapshot {
        let metrics = self.metrics.read().await;
        let get = |name: &str| metrics.counters.get(name).copied().unwrap_or(0);

        MetricsSnapshot {
            uptime_seconds: self.uptime().as_secs(),
            webhooks_received: get(counters::WEBHOOKS_RECEIVED),
            webhooks_ignored: get(counters::WEBHOOKS_IGNORED),
            webhooks_unconfigured: get(counters::WEBHOOKS_UNCONFIGURED),
            deliveries_succeeded: get(counters::DELIVERIES_SUCCEEDED),
            deliveries_failed: get(counters::DELIVERIES_FAILED),
            settings_updated: get(counters::SETTINGS_UPDATED),
            errors: get(counters::ERRORS),
        }
    }
}

/// Metrics state.
#[derive(Debug, Default)]
struct MetricsState {
    counters: HashMap<String, u64>,
}

/// Metrics snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Server uptime in seconds.
    pub uptime_seconds: u64,
    pub webhooks_received: u64,
    pub webhooks_ignored: u64,
    pub webhooks_unconfigured: u64,
    pub deliveries_succeeded: u64,
    pub deliveries_failed: u64,
    pub settings_updated: u64,
    /// Processing failures.
    pub errors: u64,
}
