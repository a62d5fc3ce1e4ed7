use std::sync::Arc;

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{CategoryPatch, NewCategory};
use crate::features::ordering::dtos::MoveResultDto;
use crate::features::ordering::{
    delete_within, move_within, persist_order, CategoryScope, OrderUpdate, PersistReport,
};
use crate::modules::store::CatalogStore;
use crate::shared::validation::slugify;

/// Service for category administration
pub struct CategoryService {
    store: Arc<dyn CatalogStore>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// All categories in display order
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.list_categories().await?;
        Ok(categories.into_iter().map(Into::into).collect())
    }

    /// Create a category at the end of the list
    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be blank".to_string()));
        }

        let display_order = self.store.next_category_order().await?;
        let category = self
            .store
            .insert_category(NewCategory {
                slug: slugify(&name),
                name,
                display_order,
            })
            .await?;

        tracing::info!(
            "Created category '{}' ({}) at position {}",
            category.slug,
            category.id,
            category.display_order
        );

        Ok(category.into())
    }

    /// Rename a category; the slug stays what it was at creation
    pub async fn rename(&self, id: Uuid, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be blank".to_string()));
        }

        self.store
            .update_category(id, CategoryPatch { name: Some(name) })
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Delete a category together with its apps
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let categories = self.store.list_categories().await?;
        let removed = delete_within(categories, id, &CategoryScope(self.store.as_ref()))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;
        tracing::info!("Deleted category {} ({})", removed.name, id);
        Ok(())
    }

    /// Write a client-computed order, one independent update per item
    pub async fn reorder(&self, items: Vec<OrderUpdate>) -> Result<PersistReport> {
        let report = persist_order(&CategoryScope(self.store.as_ref()), &items).await;
        if !report.is_complete() {
            tracing::warn!(
                "Category reorder partially failed: {} of {} updates",
                report.failed.len(),
                items.len()
            );
        }
        Ok(report)
    }

    /// Drop category `id` onto `target_id` and persist the renumbered list
    pub async fn move_category(&self, id: Uuid, target_id: Option<Uuid>) -> Result<MoveResultDto> {
        let categories = self.store.list_categories().await?;
        move_within(
            categories,
            id,
            target_id,
            &CategoryScope(self.store.as_ref()),
        )
        .await
    }
}
