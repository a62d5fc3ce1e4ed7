use std::sync::Arc;

use tokio::sync::{broadcast, watch};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::storefront::dtos::{AppDetailDto, StorefrontAppDto, StorefrontCategoryDto};
use crate::features::storefront::models::CatalogTree;
use crate::modules::realtime::{ChangeFeed, FeedMessage};
use crate::modules::store::CatalogStore;

/// Public read side of the catalog
pub struct StorefrontService {
    tree: watch::Receiver<CatalogTree>,
    store: Arc<dyn CatalogStore>,
    feed: ChangeFeed,
}

impl StorefrontService {
    pub fn new(
        tree: watch::Receiver<CatalogTree>,
        store: Arc<dyn CatalogStore>,
        feed: ChangeFeed,
    ) -> Self {
        Self { tree, store, feed }
    }

    /// Categories with their apps from the live tree, filtered by `query`
    pub fn storefront(&self, query: Option<&str>) -> Vec<StorefrontCategoryDto> {
        let tree = self.tree.borrow().clone();
        project(&tree, query)
    }

    pub async fn get_app(&self, id: Uuid) -> Result<AppDetailDto> {
        self.store
            .get_app(id)
            .await?
            .map(AppDetailDto::from)
            .ok_or_else(|| AppError::NotFound(format!("App {} not found", id)))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedMessage> {
        self.feed.subscribe()
    }
}

/// Sort both levels by `display_order`, apply the search filter and hide empty categories
pub fn project(tree: &CatalogTree, query: Option<&str>) -> Vec<StorefrontCategoryDto> {
    let needle = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut nodes: Vec<_> = tree.categories().iter().collect();
    nodes.sort_by_key(|node| node.category.display_order);

    nodes
        .into_iter()
        .filter_map(|node| {
            let mut apps: Vec<_> = node
                .apps
                .iter()
                .filter(|app| match &needle {
                    Some(needle) => {
                        app.title.to_lowercase().contains(needle)
                            || app.creator.to_lowercase().contains(needle)
                    }
                    None => true,
                })
                .collect();

            if apps.is_empty() {
                return None;
            }

            apps.sort_by_key(|app| app.display_order);
            Some(StorefrontCategoryDto::new(
                &node.category,
                apps.into_iter().map(StorefrontAppDto::from).collect(),
            ))
        })
        .collect()
}
