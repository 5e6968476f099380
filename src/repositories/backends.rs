// src/repositories/backends.rs - Key/value storage tiers
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::fs;
use tokio::sync::RwLock;

use crate::config::{StorageConfig, StorageTier};
use crate::errors::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

/// A key/value tier holding serialized collections
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Reads the raw value stored under `key`, `None` if never written
    async fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`
    async fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Durable tier: one `<key>.json` file per collection
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Opens the tier, creating the data directory if missing
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).await?;
        info!("File storage tier at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));

        // a reader never sees a half-written file
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Process-scoped tier, gone when the process exits
#[derive(Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Builds the configured tiers in priority order
pub async fn build_backends(config: &StorageConfig) -> Result<Vec<Arc<dyn StorageBackend>>> {
    let mut backends: Vec<Arc<dyn StorageBackend>> = Vec::with_capacity(config.tiers.0.len());

    for tier in &config.tiers.0 {
        let backend: Arc<dyn StorageBackend> = match tier {
            StorageTier::File => Arc::new(FileBackend::open(&config.data_dir).await?),
            StorageTier::Memory => Arc::new(MemoryBackend::new()),
        };
        backends.push(backend);
    }

    Ok(backends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageTiers;

    #[tokio::test]
    async fn test_memory_backend_read_write() {
        let backend = MemoryBackend::new();

        assert_eq!(backend.read("shortUrls").await.unwrap(), None);
        backend.write("shortUrls", "[]").await.unwrap();
        assert_eq!(backend.read("shortUrls").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_file_backend_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let backend = FileBackend::open(dir.path()).await.unwrap();
        assert_eq!(backend.read("clickEvents").await.unwrap(), None);
        backend.write("clickEvents", "[1,2]").await.unwrap();

        let reopened = FileBackend::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.read("clickEvents").await.unwrap().as_deref(),
            Some("[1,2]")
        );
        assert!(dir.path().join("clickEvents.json").exists());
        assert!(!dir.path().join("clickEvents.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_backend_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let backend = FileBackend::open(&nested).await.unwrap();
        backend.write("shortUrls", "[]").await.unwrap();

        assert!(nested.join("shortUrls.json").exists());
    }

    #[tokio::test]
    async fn test_build_backends_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: dir.path().to_path_buf(),
            tiers: StorageTiers(vec![StorageTier::Memory, StorageTier::File]),
        };

        let backends = build_backends(&config).await.unwrap();
        let names: Vec<_> = backends.iter().map(|b| b.name()).collect();

        assert_eq!(names, vec!["memory", "file"]);
    }
}
