use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::features::apps::models::App;

/// Database model for category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    /// Derived from `name` at creation, never re-derived
    pub slug: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Values for a category insert
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub display_order: i32,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
}

/// A category together with the apps it owns, as read in one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryWithApps {
    pub category: Category,
    pub apps: Vec<App>,
}
