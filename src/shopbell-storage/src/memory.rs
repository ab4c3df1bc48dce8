//! In-memory settings backend.
//!
//! Not durable: all records are lost on restart. Used for local development
//! and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backend::SettingsBackend;
use crate::error::Result;
use crate::types::TenantSettings;

/// `HashMap` keyed by tenant id behind a `tokio::sync::RwLock`.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    records: RwLock<HashMap<String, TenantSettings>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn load(&self, tenant_id: &str) -> Result<Option<TenantSettings>> {
        Ok(self.records.read().await.get(tenant_id).cloned())
    }

    async fn save(&self, settings: &TenantSettings) -> Result<()> {
        self.records
            .write()
            .await
            .insert(settings.tenant_id.clone(), settings.clone());
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_replaces_existing_record() {
        let backend = MemoryBackend::new();
        backend
            .save(&TenantSettings::new("shop-a").with_notification_url("https://a/1"))
            .await
            .unwrap();
        backend
            .save(&TenantSettings::new("shop-a").with_notification_url("https://a/2"))
            .await
            .unwrap();

        assert_eq!(backend.len().await, 1);
        let loaded = backend.load("shop-a").await.unwrap().unwrap();
        assert_eq!(loaded.notification_url.as_deref(), Some("https://a/2"));
    }

    #[tokio::test]
    async fn test_load_unknown_is_none() {
        let backend = MemoryBackend::new();
        assert!(backend.load("nobody").await.unwrap().is_none());
        assert!(backend.is_empty().await);
    }
}
