//! Catalog persistence
//!
//! `CatalogStore` is the single seam between features and the backing database.
//! Every method is an independent call; there is no multi-row transaction across
//! calls, so batch operations (like reordering) are sequences of single updates.

mod postgres;

#[cfg(test)]
mod memory;

pub use postgres::PgCatalogStore;

#[cfg(test)]
pub use memory::MemoryCatalogStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::apps::models::{App, AppPatch, AppWithCategory, NewApp};
use crate::features::categories::models::{Category, CategoryPatch, CategoryWithApps, NewCategory};

/// Row totals shown on the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CatalogCounts {
    pub apps: i64,
    pub categories: i64,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // CATEGORIES
    // =========================================================================

    /// All categories ordered by `display_order`, then name
    async fn list_categories(&self) -> Result<Vec<Category>>;

    /// Consistent two-level read: categories with their apps, both levels ordered
    async fn snapshot(&self) -> Result<Vec<CategoryWithApps>>;

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;

    async fn insert_category(&self, new: NewCategory) -> Result<Category>;

    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>>;

    /// Deletes the category and every app it owns. Returns false if it did not exist.
    async fn delete_category(&self, id: Uuid) -> Result<bool>;

    async fn set_category_order(&self, id: Uuid, display_order: i32) -> Result<bool>;

    /// `max(display_order) + 1`, or 0 when there are no categories
    async fn next_category_order(&self) -> Result<i32>;

    // =========================================================================
    // APPS
    // =========================================================================

    /// Apps with their category name, optionally restricted to one category
    async fn list_apps(&self, category_id: Option<Uuid>) -> Result<Vec<AppWithCategory>>;

    async fn get_app(&self, id: Uuid) -> Result<Option<AppWithCategory>>;

    async fn insert_app(&self, new: NewApp) -> Result<App>;

    async fn update_app(&self, id: Uuid, patch: AppPatch) -> Result<Option<App>>;

    async fn delete_app(&self, id: Uuid) -> Result<bool>;

    async fn set_app_order(&self, id: Uuid, display_order: i32) -> Result<bool>;

    /// `max(display_order) + 1` within one category, or 0 when it has no apps
    async fn next_app_order(&self, category_id: Uuid) -> Result<i32>;

    /// Atomic `downloads = downloads + 1`
    async fn increment_downloads(&self, id: Uuid) -> Result<()>;

    async fn counts(&self) -> Result<CatalogCounts>;
}
