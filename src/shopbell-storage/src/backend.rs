//! Backend abstraction for settings persistence.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::TenantSettings;

/// Raw keyed persistence for [`TenantSettings`].
///
/// Backends do no validation; [`crate::ConfigStore`] is the only intended
/// caller. Implementations must be safe for concurrent use across tenants.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Load the record for a tenant, `None` when absent.
    async fn load(&self, tenant_id: &str) -> Result<Option<TenantSettings>>;

    /// Insert or replace the record keyed by `settings.tenant_id`.
    async fn save(&self, settings: &TenantSettings) -> Result<()>;

    /// Whether records survive a process restart.
    fn is_durable(&self) -> bool;

    /// Short name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
