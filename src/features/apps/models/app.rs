use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a catalog app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct App {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    /// Free-form display string, not a currency amount
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    /// Ordering scope is the owning category
    pub display_order: i32,
    pub image_url: String,
    pub product_image_url: Option<String>,
    pub download_url: Option<String>,
    pub downloads: i64,
    pub badge_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl App {
    /// Detail-view image, falling back to the card image
    pub fn detail_image_url(&self) -> &str {
        self.product_image_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.image_url)
    }
}

/// App row joined with the owning category's name
#[derive(Debug, Clone, FromRow)]
pub struct AppWithCategory {
    #[sqlx(flatten)]
    pub app: App,
    pub category_name: Option<String>,
}

/// Values for an app insert
#[derive(Debug, Clone)]
pub struct NewApp {
    pub title: String,
    pub creator: String,
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub display_order: i32,
    pub image_url: String,
    pub product_image_url: Option<String>,
    pub download_url: Option<String>,
    pub badge_text: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
///
/// Nullable columns use `Option<Option<_>>` so they can be cleared.
#[derive(Debug, Clone, Default)]
pub struct AppPatch {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub price: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub product_image_url: Option<Option<String>>,
    pub download_url: Option<Option<String>>,
    pub badge_text: Option<Option<String>>,
}

impl AppPatch {
    /// Apply the patch to an in-memory record
    pub fn apply_to(&self, app: &mut App) {
        if let Some(title) = &self.title {
            app.title = title.clone();
        }
        if let Some(creator) = &self.creator {
            app.creator = creator.clone();
        }
        if let Some(price) = &self.price {
            app.price = price.clone();
        }
        if let Some(description) = &self.description {
            app.description = description.clone();
        }
        if let Some(category_id) = self.category_id {
            app.category_id = category_id;
        }
        if let Some(image_url) = &self.image_url {
            app.image_url = image_url.clone();
        }
        if let Some(product_image_url) = &self.product_image_url {
            app.product_image_url = product_image_url.clone();
        }
        if let Some(download_url) = &self.download_url {
            app.download_url = download_url.clone();
        }
        if let Some(badge_text) = &self.badge_text {
            app.badge_text = badge_text.clone();
        }
    }
}
