use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::collection::{OrderUpdate, OrderedCollection, Positioned};
use super::dtos::MoveResultDto;
use crate::core::error::{AppError, Result};
use crate::modules::store::CatalogStore;

/// Where a collection's positions and deletions are written
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Returns `false` if the item no longer exists
    async fn update_position(&self, id: Uuid, display_order: i32) -> Result<bool>;

    async fn remove(&self, id: Uuid) -> Result<bool>;
}

/// The category list: one scope for every category
pub struct CategoryScope<'a>(pub &'a dyn CatalogStore);

#[async_trait]
impl OrderStore for CategoryScope<'_> {
    async fn update_position(&self, id: Uuid, display_order: i32) -> Result<bool> {
        self.0.set_category_order(id, display_order).await
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        self.0.delete_category(id).await
    }
}

/// The apps of one category
pub struct AppScope<'a>(pub &'a dyn CatalogStore);

#[async_trait]
impl OrderStore for AppScope<'_> {
    async fn update_position(&self, id: Uuid, display_order: i32) -> Result<bool> {
        self.0.set_app_order(id, display_order).await
    }

    async fn remove(&self, id: Uuid) -> Result<bool> {
        self.0.delete_app(id).await
    }
}

/// Outcome of writing a reorder back, item by item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PersistReport {
    pub updated: Vec<Uuid>,
    /// Items deleted concurrently; nothing to write
    pub missing: Vec<Uuid>,
    pub failed: Vec<Uuid>,
}

impl PersistReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Write every update independently. A failure is logged and recorded; the
/// remaining updates still go through and nothing is rolled back.
pub async fn persist_order(store: &dyn OrderStore, updates: &[OrderUpdate]) -> PersistReport {
    let mut report = PersistReport::default();

    for update in updates {
        match store.update_position(update.id, update.display_order).await {
            Ok(true) => report.updated.push(update.id),
            Ok(false) => {
                tracing::debug!("Skipped order update for missing item {}", update.id);
                report.missing.push(update.id);
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to persist display_order {} for {}: {}",
                    update.display_order,
                    update.id,
                    e
                );
                report.failed.push(update.id);
            }
        }
    }

    report
}

/// Run one drag of `source` onto `target` over `items` and persist the result.
///
/// Dropping an item on itself, or releasing it outside the list (`target` is
/// `None`), changes nothing and writes nothing.
pub async fn move_within<T: Positioned>(
    items: Vec<T>,
    source: Uuid,
    target: Option<Uuid>,
    store: &dyn OrderStore,
) -> Result<MoveResultDto> {
    let mut collection = OrderedCollection::new(items);

    collection.begin_drag(source);
    if !collection.is_dimmed(source) {
        return Err(AppError::NotFound(format!("Item {} not found", source)));
    }

    match target {
        Some(target) => {
            collection.hover(target);
            if target != source && !collection.is_highlighted(target) {
                return Err(AppError::NotFound(format!(
                    "Drop target {} is not in the same list",
                    target
                )));
            }
        }
        None => collection.leave(),
    }
    tracing::debug!("Dropping {} with {:?}", source, collection.drag_state());

    let report = collection
        .finish_drag(store)
        .await
        .unwrap_or_default();

    Ok(MoveResultDto {
        order: collection.order_updates(),
        report,
    })
}

/// Take `id` out of `items` and delete it from the store.
///
/// The rest of the list keeps its positions; gaps close on the next reorder.
/// Returns `None` when `id` is not part of `items`.
pub async fn delete_within<T: Positioned>(
    items: Vec<T>,
    id: Uuid,
    store: &dyn OrderStore,
) -> Result<Option<T>> {
    let mut collection = OrderedCollection::new(items);
    collection.delete(id, store).await
}
