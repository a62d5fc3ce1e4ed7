use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::modules::store::CatalogCounts;

/// Dashboard totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminStatsDto {
    pub total_apps: i64,
    pub total_categories: i64,
    /// Clients currently subscribed to live catalog changes
    pub realtime_subscribers: usize,
}

impl AdminStatsDto {
    pub fn new(counts: CatalogCounts, realtime_subscribers: usize) -> Self {
        Self {
            total_apps: counts.apps,
            total_categories: counts.categories,
            realtime_subscribers,
        }
    }
}
