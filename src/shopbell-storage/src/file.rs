//! File-backed settings backend.
//!
//! Layout: `<data_dir>/tenants/<tenant_id>.json`, one pretty-printed
//! document per shop. Writes go to a temporary sibling file which is fsynced
//! and then renamed over the target, so readers never observe a partially
//! written record. Each write uses its own temporary file, so concurrent
//! saves never share one; concurrent upserts for the same shop resolve
//! last-write-wins.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::backend::SettingsBackend;
use crate::error::Result;
use crate::policy::validate_tenant_id;
use crate::types::TenantSettings;

const TENANTS_DIR: &str = "tenants";

/// Directory of JSON documents, one per tenant.
#[derive(Debug)]
pub struct FileBackend {
    tenants_dir: PathBuf,
    tmp_seq: AtomicU64,
}

impl FileBackend {
    /// Create a backend rooted at `data_dir`. Call [`FileBackend::init`]
    /// before first use.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            tenants_dir: data_dir.as_ref().join(TENANTS_DIR),
            tmp_seq: AtomicU64::new(0),
        }
    }

    /// Create the directory layout.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.tenants_dir).await?;
        info!(tenants_dir = %self.tenants_dir.display(), "Settings storage initialized");
        Ok(())
    }

    /// Create and initialize in one step.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let backend = Self::new(data_dir);
        backend.init().await?;
        Ok(backend)
    }

    pub fn tenants_dir(&self) -> &Path {
        &self.tenants_dir
    }

    fn record_path(&self, tenant_id: &str) -> Result<PathBuf> {
        validate_tenant_id(tenant_id)?;
        Ok(self.tenants_dir.join(format!("{tenant_id}.json")))
    }
}

#[async_trait]
impl SettingsBackend for FileBackend {
    async fn load(&self, tenant_id: &str) -> Result<Option<TenantSettings>> {
        let path = self.record_path(tenant_id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let settings: TenantSettings = serde_json::from_str(&content)?;
        Ok(Some(settings))
    }

    async fn save(&self, settings: &TenantSettings) -> Result<()> {
        let path = self.record_path(&settings.tenant_id)?;
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp_path = path.with_extension(format!("json.{seq}.tmp"));
        let content = serde_json::to_string_pretty(settings)?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp_path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &path).await?;

        // Persist the directory entry for the rename
        #[cfg(unix)]
        {
            if let Ok(dir) = fs::File::open(&self.tenants_dir).await {
                let _ = dir.sync_all().await;
            }
        }

        debug!(tenant_id = %settings.tenant_id, "Settings saved");
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
