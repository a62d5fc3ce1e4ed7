use std::sync::Arc;

use crate::core::error::Result;
use crate::features::admin::dtos::AdminStatsDto;
use crate::modules::realtime::ChangeFeed;
use crate::modules::store::CatalogStore;

/// Service for the admin dashboard
pub struct AdminService {
    store: Arc<dyn CatalogStore>,
    feed: ChangeFeed,
}

impl AdminService {
    pub fn new(store: Arc<dyn CatalogStore>, feed: ChangeFeed) -> Self {
        Self { store, feed }
    }

    pub async fn stats(&self) -> Result<AdminStatsDto> {
        let counts = self.store.counts().await?;
        Ok(AdminStatsDto::new(counts, self.feed.subscriber_count()))
    }
}
