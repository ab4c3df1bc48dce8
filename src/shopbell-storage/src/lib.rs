//! Shopbell Storage - per-shop notification settings.
//!
//! Each shop (tenant) owns at most one [`TenantSettings`] record holding the
//! Slack webhook URL that order notifications are forwarded to, plus the
//! outcome of the most recent delivery attempt.
//!
//! # Backends
//!
//! - [`MemoryBackend`]: `HashMap` behind a `RwLock`, not durable.
//! - [`FileBackend`]: one JSON document per shop under a data directory.
//!
//! Callers never talk to a backend directly. [`ConfigStore`] wraps one and
//! enforces the webhook URL policy on every write, so no caller can persist a
//! URL the policy rejects.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use shopbell_storage::{ConfigStore, MemoryBackend, WebhookUrlPolicy};
//!
//! #[tokio::main]
//! async fn main() -> shopbell_storage::Result<()> {
//!     let store = ConfigStore::new(Arc::new(MemoryBackend::new()), WebhookUrlPolicy::slack());
//!     store
//!         .set("shop-a.myshopify.com", "https://hooks.slack.com/services/T/B/X")
//!         .await?;
//!     assert!(store.get("shop-a.myshopify.com").await?.is_some());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod policy;
pub mod store;
pub mod types;

pub use backend::SettingsBackend;
pub use error::{Result, StorageError};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use policy::{SLACK_WEBHOOK_PREFIX, WebhookUrlPolicy, validate_tenant_id};
pub use store::ConfigStore;
pub use types::{DeliveryRecord, DeliveryStatus, TenantSettings};
