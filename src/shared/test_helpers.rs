//! Fixtures shared by unit and router tests

use std::sync::Mutex;

use async_trait::async_trait;
use base64::prelude::*;
use chrono::Utc;
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::apps::dtos::UploadedImage;
use crate::features::apps::models::{App, NewApp};
use crate::features::categories::models::{Category, NewCategory};
use crate::modules::storage::ImageStorage;
use crate::modules::store::{CatalogStore, MemoryCatalogStore};
use crate::shared::validation::slugify;

pub fn sample_category(name: &str, display_order: i32) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        slug: slugify(name),
        display_order,
        created_at: Utc::now(),
    }
}

pub fn sample_app(category_id: Uuid, title: &str, display_order: i32) -> App {
    App {
        id: Uuid::new_v4(),
        title: title.to_string(),
        creator: CompanyName().fake(),
        price: "Free".to_string(),
        description: Some(Sentence(3..8).fake()),
        category_id,
        display_order,
        image_url: format!("https://cdn.test/apps/{}.png", slugify(title)),
        product_image_url: None,
        download_url: None,
        downloads: 0,
        badge_text: None,
        created_at: Utc::now(),
    }
}

/// Insert a fresh category and one app in it
pub async fn seed_app(store: &MemoryCatalogStore, title: &str, download_url: Option<&str>) -> App {
    let category = store
        .insert_category(NewCategory {
            name: "Seeded".to_string(),
            slug: "seeded".to_string(),
            display_order: store.next_category_order().await.unwrap(),
        })
        .await
        .unwrap();

    store
        .insert_app(NewApp {
            title: title.to_string(),
            creator: CompanyName().fake(),
            price: "Free".to_string(),
            description: None,
            category_id: category.id,
            display_order: 0,
            image_url: "https://cdn.test/apps/seeded.png".to_string(),
            product_image_url: None,
            download_url: download_url.map(str::to_string),
            badge_text: None,
        })
        .await
        .unwrap()
}

/// Smallest valid PNG header plus padding
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 56]);
    data
}

pub fn png_image(file_name: &str) -> UploadedImage {
    UploadedImage {
        file_name: file_name.to_string(),
        content_type: "image/png".to_string(),
        data: png_bytes(),
    }
}

pub fn basic_auth_header(user: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{}:{}", user, password))
    )
}

/// Records uploads instead of sending them anywhere
#[derive(Default)]
pub struct FakeImageStorage {
    uploads: Mutex<Vec<String>>,
    failing_names: Mutex<Vec<String>>,
}

impl FakeImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object keys of successful uploads, in order
    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Fail any upload whose stored filename ends with `name`
    pub fn fail_uploads_named(&self, name: &str) {
        self.failing_names.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ImageStorage for FakeImageStorage {
    async fn upload(
        &self,
        folder: &str,
        filename: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> Result<String> {
        let failing = self
            .failing_names
            .lock()
            .unwrap()
            .iter()
            .any(|name| filename.ends_with(name.as_str()));
        if failing {
            return Err(AppError::Storage(format!("Failed to upload '{}'", filename)));
        }

        let key = format!("{}/{}", folder, filename);
        self.uploads.lock().unwrap().push(key.clone());
        Ok(format!("https://cdn.test/{}", key))
    }
}

/// Migrated pool on the database named by `TEST_DATABASE_URL`
pub async fn test_pg_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to the test database");
    crate::core::database::run_migrations(&pool)
        .await
        .expect("failed to migrate the test database");
    pool
}
