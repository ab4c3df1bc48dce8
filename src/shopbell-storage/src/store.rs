//! The configuration store used by the server.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::backend::SettingsBackend;
use crate::error::Result;
use crate::policy::{WebhookUrlPolicy, validate_tenant_id};
use crate::types::{DeliveryRecord, TenantSettings};

/// Validating facade over a [`SettingsBackend`].
///
/// Every call performs exactly one backend read or one read-modify-write;
/// nothing is cached, so each inbound event sees the latest saved URL.
/// Read-modify-write sequences are serialized per tenant so a
/// delivery-status update cannot clobber a URL saved concurrently. Writes for
/// different tenants never wait on each other.
pub struct ConfigStore {
    backend: Arc<dyn SettingsBackend>,
    policy: WebhookUrlPolicy,
    tenant_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("backend", &self.backend.backend_name())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ConfigStore {
    pub fn new(backend: Arc<dyn SettingsBackend>, policy: WebhookUrlPolicy) -> Self {
        Self {
            backend,
            policy,
            tenant_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Exclusive write access to one tenant's record.
    async fn lock_tenant(&self, tenant_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.tenant_locks.lock().await;
            locks
                .entry(tenant_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    /// The configured webhook URL for a tenant.
    ///
    /// Unknown tenants, and ids that could never have been stored, yield
    /// `Ok(None)`.
    pub async fn get(&self, tenant_id: &str) -> Result<Option<String>> {
        Ok(self
            .settings(tenant_id)
            .await?
            .and_then(|settings| settings.notification_url))
    }

    /// The full settings record for a tenant.
    pub async fn settings(&self, tenant_id: &str) -> Result<Option<TenantSettings>> {
        if validate_tenant_id(tenant_id).is_err() {
            debug!(tenant_id, "Lookup for invalid tenant id");
            return Ok(None);
        }
        self.backend.load(tenant_id).await
    }

    /// Validate and upsert the webhook URL for a tenant.
    ///
    /// Returns the URL as stored (trimmed). The previous delivery status is
    /// kept.
    pub async fn set(&self, tenant_id: &str, url: &str) -> Result<String> {
        validate_tenant_id(tenant_id)?;
        let url = self.policy.validate(url)?;

        let _guard = self.lock_tenant(tenant_id).await;
        let mut settings = self
            .backend
            .load(tenant_id)
            .await?
            .unwrap_or_else(|| TenantSettings::new(tenant_id));
        settings.notification_url = Some(url.clone());
        settings.updated_at = Utc::now();
        self.backend.save(&settings).await?;

        info!(tenant_id, backend = self.backend_name(), "Webhook URL saved");
        Ok(url)
    }

    /// Attach the outcome of a delivery attempt to an existing record.
    ///
    /// Does nothing when the tenant has no record.
    pub async fn record_delivery(&self, tenant_id: &str, record: DeliveryRecord) -> Result<()> {
        if validate_tenant_id(tenant_id).is_err() {
            return Ok(());
        }

        let _guard = self.lock_tenant(tenant_id).await;
        let Some(mut settings) = self.backend.load(tenant_id).await? else {
            debug!(tenant_id, "No settings record, delivery status not stored");
            return Ok(());
        };
        settings.last_delivery = Some(record);
        settings.updated_at = Utc::now();
        self.backend.save(&settings).await
    }
}
