use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use super::cache::CatalogCache;

/// Background task that periodically polls the catalog source
pub struct CatalogRefresher {
    cache: Arc<CatalogCache>,
    interval: Duration,
}

impl CatalogRefresher {
    pub fn new(cache: Arc<CatalogCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// Poll loop; runs until the task is aborted
    pub async fn start_background_task(self: Arc<Self>) {
        info!(
            "Starting catalog refresher for {} (interval: {:?})",
            self.cache.source_description(),
            self.interval
        );

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; the server already loaded the catalog
        interval.tick().await;

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Run a single poll, logging the outcome
    pub async fn tick(&self) -> bool {
        match self.cache.check_source().await {
            Ok(true) => {
                info!("Catalog updated from {}", self.cache.source_description());
                true
            }
            Ok(false) => {
                debug!("Catalog unchanged");
                false
            }
            Err(e) => {
                error!("Catalog refresh failed: {}", e);
                false
            }
        }
    }
}
