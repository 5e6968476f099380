// src/services/short_link.rs - Business logic
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};
use tokio::sync::Mutex;
use validator::Validate;

use crate::config::LinkConfig;
use crate::errors::{flatten_validation_errors, ServiceError};
use crate::models::{CreateLinksRequest, ShortLink};
use crate::repositories::LinkStore;
use crate::telemetry::Telemetry;
use crate::utils::Clock;
use crate::validations::validate_batch;

type Result<T> = std::result::Result<T, ServiceError>;

#[async_trait]
pub trait ShortLinkServiceTrait {
    /// Validates a batch and appends it to the store, all or nothing
    async fn create_batch(&self, dto: CreateLinksRequest) -> Result<Vec<ShortLink>>;

    /// Every stored link, expired ones included
    async fn list(&self) -> Result<Vec<ShortLink>>;
}

pub struct ShortLinkService<T: LinkStore> {
    store: Arc<T>,
    clock: Arc<dyn Clock>,
    telemetry: Telemetry,
    config: LinkConfig,
    /// Held from reading the used codes until the batch is appended
    create_lock: Mutex<()>,
}

impl<T: LinkStore> ShortLinkService<T> {
    pub fn new(
        store: Arc<T>,
        clock: Arc<dyn Clock>,
        telemetry: Telemetry,
        config: LinkConfig,
    ) -> Self {
        Self {
            store,
            clock,
            telemetry,
            config,
            create_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

#[async_trait]
impl<T: LinkStore + Send + Sync> ShortLinkServiceTrait for ShortLinkService<T> {
    async fn create_batch(&self, dto: CreateLinksRequest) -> Result<Vec<ShortLink>> {
        if let Err(e) = dto.validate() {
            let message = flatten_validation_errors(&e);
            self.telemetry.error("service", format!("Batch rejected: {}", message));
            return Err(ServiceError::Validation(message));
        }

        let guard = self.create_lock.lock().await;

        let existing: HashSet<String> = self
            .store
            .list_all()
            .await?
            .into_iter()
            .map(|link| link.short_code)
            .collect();

        let links = match validate_batch(&dto.rows, &existing, &self.config, self.clock.now()) {
            Ok(links) => links,
            Err(errors) => {
                for err in &errors {
                    warn!("{}", err);
                    self.telemetry.error("service", err.to_string());
                }
                return Err(ServiceError::Rejected(errors));
            }
        };

        self.store.append(&links).await?;
        drop(guard);

        for link in &links {
            let minutes = (link.expiry - link.created_at).num_minutes();
            info!(
                "Short URL created: {} for {} (valid {} min)",
                link.short_code, link.original_url, minutes
            );
            self.telemetry.info(
                "service",
                format!(
                    "Short URL created: {} for {} (valid {} min)",
                    link.short_code, link.original_url, minutes
                ),
            );
        }

        Ok(links)
    }

    async fn list(&self) -> Result<Vec<ShortLink>> {
        Ok(self.store.list_all().await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::errors::{RowError, RowErrorKind};
    use crate::models::LinkRowInput;
    use crate::repositories::{FileBackend, MockLinkStore, StorageBackend, TieredLinkStore};
    use crate::utils::clock::ManualClock;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()))
    }

    fn build_service<T: LinkStore>(store: Arc<T>) -> ShortLinkService<T> {
        ShortLinkService::new(store, clock(), Telemetry::disabled(), LinkConfig::default())
    }

    fn request(rows: Vec<LinkRowInput>) -> CreateLinksRequest {
        CreateLinksRequest { rows }
    }

    #[tokio::test]
    async fn test_create_batch_appends_every_row() {
        let store = Arc::new(TieredLinkStore::in_memory());
        let service = build_service(store.clone());

        for size in 1..=5 {
            let rows = (0..size)
                .map(|i| LinkRowInput::new(format!("https://example.com/{}", i)))
                .collect();
            let before = store.list_all().await.unwrap().len();

            let created = service.create_batch(request(rows)).await.unwrap();

            let all = store.list_all().await.unwrap();
            assert_eq!(created.len(), size);
            assert_eq!(all.len(), before + size);
            let unique: HashSet<_> = all.iter().map(|l| l.short_code.as_str()).collect();
            assert_eq!(unique.len(), all.len());
        }
    }

    #[tokio::test]
    async fn test_one_minute_validity_scenario() {
        let store = Arc::new(TieredLinkStore::in_memory());
        let service = build_service(store);

        let created = service
            .create_batch(request(vec![LinkRowInput::new("https://example.com")
                .with_validity("1")
                .with_shortcode("")]))
            .await
            .unwrap();

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].expiry - created[0].created_at, Duration::seconds(60));
        assert_eq!(created[0].short_code.len(), 6);
    }

    #[tokio::test]
    async fn test_custom_code_collides_with_stored_link() {
        let store = Arc::new(TieredLinkStore::in_memory());
        let service = build_service(store.clone());

        let first = LinkRowInput::new("https://a.example").with_shortcode("promo1");
        let second = LinkRowInput::new("https://b.example").with_shortcode("promo1");

        service.create_batch(request(vec![first])).await.unwrap();
        let err = service
            .create_batch(request(vec![second]))
            .await
            .unwrap_err();

        match err {
            ServiceError::Rejected(rows) => assert_eq!(
                rows,
                vec![RowError::new(1, RowErrorKind::ShortcodeCollision("promo1".into()))]
            ),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_batch_never_writes() {
        let mut store = MockLinkStore::new();
        store.expect_list_all().returning(|| Ok(vec![]));
        store.expect_append().never();

        let service = build_service(Arc::new(store));
        let err = service
            .create_batch(request(vec![
                LinkRowInput::new("https://ok.example"),
                LinkRowInput::new("https://bad.example").with_shortcode("no"),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Rejected(ref rows) if rows.len() == 1));
    }

    #[tokio::test]
    async fn test_duplicate_custom_codes_in_one_batch() {
        let mut store = MockLinkStore::new();
        store.expect_list_all().returning(|| Ok(vec![]));
        store.expect_append().never();

        let service = build_service(Arc::new(store));
        let err = service
            .create_batch(request(vec![
                LinkRowInput::new("https://a.example").with_shortcode("promo1"),
                LinkRowInput::new("https://b.example").with_shortcode("promo1"),
            ]))
            .await
            .unwrap_err();

        match err {
            ServiceError::Rejected(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].row, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_batch_is_rejected_before_store() {
        let mut store = MockLinkStore::new();
        store.expect_list_all().never();
        store.expect_append().never();

        let service = build_service(Arc::new(store));
        let rows = vec![LinkRowInput::new("https://example.com"); 6];

        let err = service.create_batch(request(rows)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockLinkStore::new();
        store.expect_list_all().returning(|| Ok(vec![]));
        store
            .expect_append()
            .times(1)
            .returning(|_| Err(crate::errors::StoreError::NoBackend));

        let service = build_service(Arc::new(store));
        let err = service
            .create_batch(request(vec![LinkRowInput::new("https://example.com")]))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Store(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions_never_share_a_code() {
        for round in 0..20 {
            let dir = tempfile::tempdir().unwrap();
            let file = FileBackend::open(dir.path()).await.unwrap();
            let store = Arc::new(TieredLinkStore::new(vec![
                Arc::new(file) as Arc<dyn StorageBackend>
            ]));
            let service = Arc::new(build_service(store.clone()));

            let submissions: Vec<_> = ["https://a.example", "https://b.example"]
                .into_iter()
                .map(|url| {
                    let service = service.clone();
                    let rows = vec![LinkRowInput::new(url).with_shortcode("promo1")];
                    tokio::spawn(async move { service.create_batch(request(rows)).await })
                })
                .collect();

            let mut accepted = 0;
            for submission in submissions {
                match submission.await.unwrap() {
                    Ok(_) => accepted += 1,
                    Err(ServiceError::Rejected(rows)) => assert_eq!(
                        rows[0].kind,
                        RowErrorKind::ShortcodeCollision("promo1".into())
                    ),
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }

            let stored = store.list_all().await.unwrap();
            assert_eq!(accepted, 1, "round {}", round);
            assert_eq!(stored.iter().filter(|l| l.short_code == "promo1").count(), 1);
        }
    }
}
