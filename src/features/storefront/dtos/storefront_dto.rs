use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::apps::models::{App, AppWithCategory};
use crate::features::categories::models::Category;

/// Query params for the storefront listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct StorefrontQuery {
    /// Case-insensitive match on app title or creator
    pub q: Option<String>,
}

/// Where the public download endpoint for an app lives
fn download_path(app: &App) -> Option<String> {
    app.download_url
        .as_ref()
        .map(|_| format!("/api/download/{}", app.id))
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorefrontAppDto {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub display_order: i32,
    pub image_url: String,
    /// Detail image, the card image when none was uploaded
    pub product_image_url: String,
    pub download_path: Option<String>,
    pub downloads: i64,
    pub badge_text: Option<String>,
}

impl From<&App> for StorefrontAppDto {
    fn from(app: &App) -> Self {
        Self {
            id: app.id,
            title: app.title.clone(),
            creator: app.creator.clone(),
            price: app.price.clone(),
            description: app.description.clone(),
            category_id: app.category_id,
            display_order: app.display_order,
            image_url: app.image_url.clone(),
            product_image_url: app.detail_image_url().to_string(),
            download_path: download_path(app),
            downloads: app.downloads,
            badge_text: app.badge_text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StorefrontCategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub display_order: i32,
    pub apps: Vec<StorefrontAppDto>,
}

impl StorefrontCategoryDto {
    pub fn new(category: &Category, apps: Vec<StorefrontAppDto>) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            display_order: category.display_order,
            apps,
        }
    }
}

/// Public app detail page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppDetailDto {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub image_url: String,
    pub product_image_url: String,
    pub download_path: Option<String>,
    pub downloads: i64,
    pub badge_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AppWithCategory> for AppDetailDto {
    fn from(entry: AppWithCategory) -> Self {
        let product_image_url = entry.app.detail_image_url().to_string();
        let download_path = download_path(&entry.app);
        let app = entry.app;
        Self {
            id: app.id,
            title: app.title,
            creator: app.creator,
            price: app.price,
            description: app.description,
            category_id: app.category_id,
            category_name: entry.category_name,
            image_url: app.image_url,
            product_image_url,
            download_path,
            downloads: app.downloads,
            badge_text: app.badge_text,
            created_at: app.created_at,
        }
    }
}
