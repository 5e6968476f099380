// src/services/insights.rs - Click analytics
use std::sync::Arc;

use log::debug;

use crate::errors::StoreError;
use crate::models::LinkInsight;
use crate::repositories::LinkStore;

/// Read-only view pairing every link with its click history
pub struct InsightsService<T: LinkStore> {
    store: Arc<T>,
}

impl<T: LinkStore> InsightsService<T> {
    pub fn new(store: Arc<T>) -> Self {
        Self { store }
    }

    /// One entry per stored link, in insertion order, expired links included
    pub async fn collect(&self) -> Result<Vec<LinkInsight>, StoreError> {
        let links = self.store.list_all().await?;
        let clicks = self.store.list_clicks(None).await?;

        let insights: Vec<LinkInsight> = links
            .into_iter()
            .map(|link| {
                let clicks = clicks
                    .iter()
                    .filter(|c| c.short_code == link.short_code)
                    .cloned()
                    .collect();
                LinkInsight { link, clicks }
            })
            .collect();

        debug!("Collected insights for {} link(s)", insights.len());
        Ok(insights)
    }

    /// Insight for a single code, `None` when no such link exists
    pub async fn for_code(&self, code: &str) -> Result<Option<LinkInsight>, StoreError> {
        let Some(link) = self
            .store
            .list_all()
            .await?
            .into_iter()
            .find(|l| l.short_code == code)
        else {
            return Ok(None);
        };

        let clicks = self.store.list_clicks(Some(code.to_string())).await?;
        Ok(Some(LinkInsight { link, clicks }))
    }
}
