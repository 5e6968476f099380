mod backends;
mod link_store;

pub use backends::{build_backends, FileBackend, MemoryBackend, StorageBackend};
pub use link_store::{LinkStore, TieredLinkStore, CLICK_EVENTS_KEY, SHORT_URLS_KEY};

#[cfg(test)]
pub use link_store::MockLinkStore;
