// src/repositories/link_store.rs - Data access
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use super::backends::{MemoryBackend, StorageBackend};
use crate::errors::StoreError;
use crate::models::{ClickEvent, ShortLink};

/// Storage key of the short link collection
pub const SHORT_URLS_KEY: &str = "shortUrls";
/// Storage key of the click event collection
pub const CLICK_EVENTS_KEY: &str = "clickEvents";

type Result<T> = std::result::Result<T, StoreError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Appends a batch of short links after the existing ones
    ///
    /// ### Errors
    /// * `StoreError::Io` - If the primary tier cannot be written
    /// * `StoreError::Serialization` - If the collection cannot be encoded
    async fn append(&self, links: &[ShortLink]) -> Result<()>;

    /// Returns a copy of every stored short link, in insertion order
    async fn list_all(&self) -> Result<Vec<ShortLink>>;

    /// Records one click event
    ///
    /// ### Errors
    /// * `StoreError::Io` - If the primary tier cannot be written
    async fn append_click(&self, event: &ClickEvent) -> Result<()>;

    /// Returns click events, all of them or only those of `short_code`
    async fn list_clicks(&self, short_code: Option<String>) -> Result<Vec<ClickEvent>>;
}

/// Link store over ordered storage tiers.
///
/// Reads take the first tier holding a non-empty collection. Writes replace
/// the whole collection in the first tier. A tier that fails to read or
/// holds unparsable JSON counts as empty.
///
/// The write lock serializes read-modify-write cycles inside this process
/// only; another process sharing the data directory can still lose updates.
pub struct TieredLinkStore {
    backends: Vec<Arc<dyn StorageBackend>>,
    write_lock: Mutex<()>,
}

impl TieredLinkStore {
    pub fn new(backends: Vec<Arc<dyn StorageBackend>>) -> Self {
        Self {
            backends,
            write_lock: Mutex::new(()),
        }
    }

    /// Store backed by a single process-scoped tier
    pub fn in_memory() -> Self {
        let memory: Arc<dyn StorageBackend> = Arc::new(MemoryBackend::new());
        Self::new(vec![memory])
    }

    /// Names of the tiers in priority order
    pub fn tier_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        for backend in &self.backends {
            let raw = match backend.read(key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Failed to read '{}' from {} tier: {}", key, backend.name(), e);
                    continue;
                }
            };

            match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(items) if items.is_empty() => continue,
                Ok(items) => {
                    debug!("Loaded {} '{}' from {} tier", items.len(), key, backend.name());
                    return items;
                }
                Err(e) => {
                    warn!(
                        "Corrupted '{}' in {} tier treated as empty: {}",
                        key,
                        backend.name(),
                        e
                    );
                }
            }
        }

        Vec::new()
    }

    async fn save<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let primary = self.backends.first().ok_or(StoreError::NoBackend)?;
        let json = serde_json::to_string(items)?;

        primary.write(key, &json).await.map_err(|e| {
            log::error!("Failed to write '{}' to {} tier: {}", key, primary.name(), e);
            e
        })
    }
}

#[async_trait]
impl LinkStore for TieredLinkStore {
    async fn append(&self, links: &[ShortLink]) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all: Vec<ShortLink> = self.load(SHORT_URLS_KEY).await;
        all.extend_from_slice(links);
        self.save(SHORT_URLS_KEY, &all).await
    }

    async fn list_all(&self) -> Result<Vec<ShortLink>> {
        Ok(self.load(SHORT_URLS_KEY).await)
    }

    async fn append_click(&self, event: &ClickEvent) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut all: Vec<ClickEvent> = self.load(CLICK_EVENTS_KEY).await;
        all.push(event.clone());
        self.save(CLICK_EVENTS_KEY, &all).await
    }

    async fn list_clicks(&self, short_code: Option<String>) -> Result<Vec<ClickEvent>> {
        let all: Vec<ClickEvent> = self.load(CLICK_EVENTS_KEY).await;

        Ok(match short_code {
            Some(code) => all.into_iter().filter(|c| c.short_code == code).collect(),
            None => all,
        })
    }
}
