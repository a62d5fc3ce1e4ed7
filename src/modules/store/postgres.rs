use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{CatalogCounts, CatalogStore};
use crate::core::error::{AppError, Result};
use crate::features::apps::models::{App, AppPatch, AppWithCategory, NewApp};
use crate::features::categories::models::{Category, CategoryPatch, CategoryWithApps, NewCategory};

const CATEGORY_COLUMNS: &str = "id, name, slug, display_order, created_at";

const APP_COLUMNS: &str = "id, title, creator, price, description, category_id, display_order, \
     image_url, product_image_url, download_url, downloads, badge_text, created_at";

const APP_WITH_CATEGORY_SELECT: &str = "SELECT a.id, a.title, a.creator, a.price, a.description, \
     a.category_id, a.display_order, a.image_url, a.product_image_url, a.download_url, \
     a.downloads, a.badge_text, a.created_at, c.name AS category_name \
     FROM apps a LEFT JOIN categories c ON c.id = a.category_id";

/// Split a clearable column into "was it sent" and its new value
fn nullable(value: Option<Option<String>>) -> (bool, Option<String>) {
    match value {
        Some(inner) => (true, inner),
        None => (false, None),
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// `CatalogStore` backed by PostgreSQL
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn list_categories(&self) -> Result<Vec<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list categories"))
    }

    async fn snapshot(&self) -> Result<Vec<CategoryWithApps>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin snapshot transaction"))?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(db_error("set snapshot isolation"))?;

        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories ORDER BY display_order, name",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("snapshot categories"))?;

        let apps = sqlx::query_as::<_, App>(&format!(
            "SELECT {} FROM apps ORDER BY display_order, created_at",
            APP_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("snapshot apps"))?;

        tx.commit()
            .await
            .map_err(db_error("commit snapshot transaction"))?;

        let mut by_category: HashMap<Uuid, Vec<App>> = HashMap::new();
        for app in apps {
            by_category.entry(app.category_id).or_default().push(app);
        }

        Ok(categories
            .into_iter()
            .map(|category| CategoryWithApps {
                apps: by_category.remove(&category.id).unwrap_or_default(),
                category,
            })
            .collect())
    }

    async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get category"))
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(&format!(
            "INSERT INTO categories (name, slug, display_order) VALUES ($1, $2, $3) RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.slug)
        .bind(new.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert category"))
    }

    async fn update_category(&self, id: Uuid, patch: CategoryPatch) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "UPDATE categories SET name = COALESCE($2, name) WHERE id = $1 RETURNING {}",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(patch.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update category"))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete category"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_category_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        let result = sqlx::query("UPDATE categories SET display_order = $2 WHERE id = $1")
            .bind(id)
            .bind(display_order)
            .execute(&self.pool)
            .await
            .map_err(db_error("update category order"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn next_category_order(&self) -> Result<i32> {
        sqlx::query_scalar::<_, i32>("SELECT COALESCE(MAX(display_order) + 1, 0) FROM categories")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("compute next category order"))
    }

    async fn list_apps(&self, category_id: Option<Uuid>) -> Result<Vec<AppWithCategory>> {
        sqlx::query_as::<_, AppWithCategory>(&format!(
            "{} WHERE ($1::uuid IS NULL OR a.category_id = $1) \
             ORDER BY c.display_order, a.display_order, a.created_at",
            APP_WITH_CATEGORY_SELECT
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list apps"))
    }

    async fn get_app(&self, id: Uuid) -> Result<Option<AppWithCategory>> {
        sqlx::query_as::<_, AppWithCategory>(&format!(
            "{} WHERE a.id = $1",
            APP_WITH_CATEGORY_SELECT
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get app"))
    }

    async fn insert_app(&self, new: NewApp) -> Result<App> {
        sqlx::query_as::<_, App>(&format!(
            "INSERT INTO apps (title, creator, price, description, category_id, display_order, \
             image_url, product_image_url, download_url, badge_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            APP_COLUMNS
        ))
        .bind(&new.title)
        .bind(&new.creator)
        .bind(&new.price)
        .bind(&new.description)
        .bind(new.category_id)
        .bind(new.display_order)
        .bind(&new.image_url)
        .bind(&new.product_image_url)
        .bind(&new.download_url)
        .bind(&new.badge_text)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("insert app"))
    }

    async fn update_app(&self, id: Uuid, patch: AppPatch) -> Result<Option<App>> {
        // `downloads` is never written here; concurrent increments must survive
        let (set_description, description) = nullable(patch.description);
        let (set_product_image, product_image_url) = nullable(patch.product_image_url);
        let (set_download_url, download_url) = nullable(patch.download_url);
        let (set_badge, badge_text) = nullable(patch.badge_text);

        sqlx::query_as::<_, App>(&format!(
            "UPDATE apps SET \
             title = COALESCE($2, title), \
             creator = COALESCE($3, creator), \
             price = COALESCE($4, price), \
             description = CASE WHEN $5 THEN $6 ELSE description END, \
             category_id = COALESCE($7, category_id), \
             image_url = COALESCE($8, image_url), \
             product_image_url = CASE WHEN $9 THEN $10 ELSE product_image_url END, \
             download_url = CASE WHEN $11 THEN $12 ELSE download_url END, \
             badge_text = CASE WHEN $13 THEN $14 ELSE badge_text END \
             WHERE id = $1 RETURNING {}",
            APP_COLUMNS
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.creator)
        .bind(patch.price)
        .bind(set_description)
        .bind(description)
        .bind(patch.category_id)
        .bind(patch.image_url)
        .bind(set_product_image)
        .bind(product_image_url)
        .bind(set_download_url)
        .bind(download_url)
        .bind(set_badge)
        .bind(badge_text)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update app"))
    }

    async fn delete_app(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM apps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete app"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_app_order(&self, id: Uuid, display_order: i32) -> Result<bool> {
        let result = sqlx::query("UPDATE apps SET display_order = $2 WHERE id = $1")
            .bind(id)
            .bind(display_order)
            .execute(&self.pool)
            .await
            .map_err(db_error("update app order"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn next_app_order(&self, category_id: Uuid) -> Result<i32> {
        sqlx::query_scalar::<_, i32>(
            "SELECT COALESCE(MAX(display_order) + 1, 0) FROM apps WHERE category_id = $1",
        )
        .bind(category_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("compute next app order"))
    }

    async fn increment_downloads(&self, id: Uuid) -> Result<()> {
        sqlx::query("SELECT increment_downloads($1)")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("increment downloads"))?;

        Ok(())
    }

    async fn counts(&self) -> Result<CatalogCounts> {
        let (apps, categories) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM apps), (SELECT COUNT(*) FROM categories)",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count catalog rows"))?;

        Ok(CatalogCounts { apps, categories })
    }
}
