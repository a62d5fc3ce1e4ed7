use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::apps::dtos::{
    AppForm, AppResponseDto, CreateAppDto, UpdateAppDto, UploadedImage,
};
use crate::features::apps::models::{App, AppPatch, NewApp};
use crate::features::ordering::dtos::MoveResultDto;
use crate::features::ordering::{
    delete_within, move_within, persist_order, AppScope, OrderUpdate, PersistReport,
};
use crate::modules::storage::ImageStorage;
use crate::modules::store::CatalogStore;
use crate::shared::constants::APP_IMAGES_FOLDER;
use crate::shared::validation::stored_filename;

/// Service for app administration
pub struct AppService {
    store: Arc<dyn CatalogStore>,
    images: Arc<dyn ImageStorage>,
}

impl AppService {
    pub fn new(store: Arc<dyn CatalogStore>, images: Arc<dyn ImageStorage>) -> Self {
        Self { store, images }
    }

    async fn upload_image(&self, image: UploadedImage) -> Result<String> {
        let filename = stored_filename(&image.file_name, Utc::now().timestamp_millis());
        self.images
            .upload(APP_IMAGES_FOLDER, &filename, image.data, &image.content_type)
            .await
    }

    async fn ensure_category(&self, id: Uuid) -> Result<()> {
        match self.store.get_category(id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::Validation(format!("Category {} does not exist", id))),
        }
    }

    pub async fn list(&self, category_id: Option<Uuid>) -> Result<Vec<AppResponseDto>> {
        let apps = self.store.list_apps(category_id).await?;
        Ok(apps.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<AppResponseDto> {
        self.store
            .get_app(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("App {} not found", id)))
    }

    /// Create an app from a submitted form.
    ///
    /// The card image is required and checked before anything is stored. If the
    /// product image upload fails the whole create fails; the card image already
    /// uploaded stays in storage.
    pub async fn create(&self, mut form: AppForm) -> Result<AppResponseDto> {
        let card = form
            .image
            .take()
            .ok_or_else(|| AppError::Validation("Card image is required".to_string()))?;
        card.validate("image")?;
        if let Some(product) = &form.product_image {
            product.validate("product_image")?;
        }

        let dto = CreateAppDto::try_from(&form)?;
        self.ensure_category(dto.category_id).await?;

        let image_url = self.upload_image(card).await?;

        let product_image_url = match form.product_image.take() {
            Some(product) => match self.upload_image(product).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(
                        "Product image upload failed, card image {} is left orphaned: {}",
                        image_url, e
                    );
                    return Err(e);
                }
            },
            None => None,
        };

        let display_order = self.store.next_app_order(dto.category_id).await?;
        let app = self
            .store
            .insert_app(NewApp {
                title: dto.title,
                creator: dto.creator,
                price: dto.price,
                description: dto.description,
                category_id: dto.category_id,
                display_order,
                image_url,
                product_image_url,
                download_url: dto.download_url,
                badge_text: dto.badge_text,
            })
            .await?;

        info!("Created app '{}' ({})", app.title, app.id);
        self.get(app.id).await
    }

    /// Apply a submitted form to an existing app.
    ///
    /// Only sent fields change; an empty optional field clears it. A failed image
    /// upload keeps the previous image.
    pub async fn update(&self, id: Uuid, mut form: AppForm) -> Result<AppResponseDto> {
        if self.store.get_app(id).await?.is_none() {
            return Err(AppError::NotFound(format!("App {} not found", id)));
        }

        let mut patch = AppPatch::from(UpdateAppDto::try_from(&form)?);
        if let Some(category_id) = patch.category_id {
            self.ensure_category(category_id).await?;
        }

        if let Some(card) = form.image.take() {
            card.validate("image")?;
            match self.upload_image(card).await {
                Ok(url) => patch.image_url = Some(url),
                Err(e) => warn!("Keeping previous card image of app {}: {}", id, e),
            }
        }

        if let Some(product) = form.product_image.take() {
            product.validate("product_image")?;
            match self.upload_image(product).await {
                Ok(url) => patch.product_image_url = Some(Some(url)),
                Err(e) => warn!("Keeping previous product image of app {}: {}", id, e),
            }
        }

        self.store
            .update_app(id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("App {} not found", id)))?;

        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let siblings = self.siblings_of(id).await?;
        delete_within(siblings, id, &AppScope(self.store.as_ref()))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("App {} not found", id)))?;
        info!("Deleted app {}", id);
        Ok(())
    }

    /// Write a client-computed order for the apps of one category
    pub async fn reorder(&self, category_id: Uuid, items: Vec<OrderUpdate>) -> Result<PersistReport> {
        if self.store.get_category(category_id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Category {} not found",
                category_id
            )));
        }

        let members: HashSet<Uuid> = self
            .store
            .list_apps(Some(category_id))
            .await?
            .into_iter()
            .map(|entry| entry.app.id)
            .collect();
        if let Some(stranger) = items.iter().find(|item| !members.contains(&item.id)) {
            return Err(AppError::Validation(format!(
                "App {} does not belong to category {}",
                stranger.id, category_id
            )));
        }

        let report = persist_order(&AppScope(self.store.as_ref()), &items).await;
        if !report.is_complete() {
            warn!(
                "App reorder in category {} partially failed: {} of {} updates",
                category_id,
                report.failed.len(),
                items.len()
            );
        }
        Ok(report)
    }

    /// Drop app `id` onto `target_id` within its category
    pub async fn move_app(&self, id: Uuid, target_id: Option<Uuid>) -> Result<MoveResultDto> {
        let siblings = self.siblings_of(id).await?;
        move_within(siblings, id, target_id, &AppScope(self.store.as_ref())).await
    }

    /// Every app of the category `id` belongs to, `id` included
    async fn siblings_of(&self, id: Uuid) -> Result<Vec<App>> {
        let app = self
            .store
            .get_app(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("App {} not found", id)))?;

        Ok(self
            .store
            .list_apps(Some(app.app.category_id))
            .await?
            .into_iter()
            .map(|entry| entry.app)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::NewCategory;
    use crate::modules::store::MemoryCatalogStore;
    use crate::shared::test_helpers::{png_image, FakeImageStorage};

    struct Fixture {
        service: AppService,
        store: Arc<MemoryCatalogStore>,
        images: Arc<FakeImageStorage>,
        category: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryCatalogStore::new());
        let images = Arc::new(FakeImageStorage::new());
        let category = store
            .insert_category(NewCategory {
                name: "Games".to_string(),
                slug: "games".to_string(),
                display_order: 0,
            })
            .await
            .unwrap()
            .id;
        Fixture {
            service: AppService::new(store.clone(), images.clone()),
            store,
            images,
            category,
        }
    }

    fn form(category: Uuid, title: &str) -> AppForm {
        AppForm {
            title: Some(title.to_string()),
            creator: Some("Speed Inc".to_string()),
            price: Some("Free".to_string()),
            category_id: Some(category.to_string()),
            download_url: Some("https://files.example.com/racer.zip".to_string()),
            image: Some(png_image("My Card (1).png")),
            ..AppForm::default()
        }
    }

    #[tokio::test]
    async fn test_create_uploads_and_appends() {
        let f = fixture().await;

        let first = f.service.create(form(f.category, "One")).await.unwrap();
        let second = f.service.create(form(f.category, "Two")).await.unwrap();

        assert_eq!(first.display_order, 0);
        assert_eq!(second.display_order, 1);
        assert_eq!(first.category_name.as_deref(), Some("Games"));
        assert!(first.image_url.starts_with("https://cdn.test/apps/"));
        assert!(first.image_url.ends_with("-MyCard1.png"));
        assert_eq!(f.images.uploads().len(), 2);
    }

    #[tokio::test]
    async fn test_create_without_card_image_stores_nothing() {
        let f = fixture().await;
        let mut without_image = form(f.category, "One");
        without_image.image = None;

        let err = f.service.create(without_image).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(f.images.uploads().is_empty());
        assert!(f.store.list_apps(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_product_image_aborts_create() {
        let f = fixture().await;
        let mut with_product = form(f.category, "One");
        with_product.product_image = Some(png_image("detail.png"));
        f.images.fail_uploads_named("detail.png");

        let err = f.service.create(with_product).await.unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
        // Card image went up and is not cleaned
        assert_eq!(f.images.uploads().len(), 1);
        assert!(f.store.list_apps(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_image_when_upload_fails() {
        let f = fixture().await;
        let created = f.service.create(form(f.category, "One")).await.unwrap();

        f.images.fail_uploads_named("new-card.png");
        let update = AppForm {
            title: Some("One Renamed".to_string()),
            badge_text: Some(String::new()),
            image: Some(png_image("new-card.png")),
            ..AppForm::default()
        };
        let updated = f.service.update(created.id, update).await.unwrap();

        assert_eq!(updated.title, "One Renamed");
        assert_eq!(updated.image_url, created.image_url);
        assert_eq!(updated.badge_text, None);
        assert_eq!(updated.creator, created.creator);
    }

    #[tokio::test]
    async fn test_update_enforces_field_lengths() {
        let f = fixture().await;
        let created = f.service.create(form(f.category, "One")).await.unwrap();

        let update = AppForm {
            title: Some("t".repeat(201)),
            image: Some(png_image("ignored.png")),
            ..AppForm::default()
        };
        let err = f.service.update(created.id, update).await.unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(f.service.get(created.id).await.unwrap().title, "One");
        assert_eq!(f.images.uploads().len(), 1);
    }

    #[tokio::test]
    async fn test_update_rejects_unknown_category() {
        let f = fixture().await;
        let created = f.service.create(form(f.category, "One")).await.unwrap();

        let update = AppForm {
            category_id: Some(Uuid::new_v4().to_string()),
            ..AppForm::default()
        };
        let err = f.service.update(created.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reorder_rejects_apps_from_other_categories() {
        let f = fixture().await;
        let created = f.service.create(form(f.category, "One")).await.unwrap();

        let other = f
            .store
            .insert_category(NewCategory {
                name: "Tools".to_string(),
                slug: "tools".to_string(),
                display_order: 1,
            })
            .await
            .unwrap();

        let err = f
            .service
            .reorder(
                other.id,
                vec![OrderUpdate {
                    id: created.id,
                    display_order: 0,
                }],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_move_app_within_category() {
        let f = fixture().await;
        let a = f.service.create(form(f.category, "A")).await.unwrap();
        let b = f.service.create(form(f.category, "B")).await.unwrap();
        let c = f.service.create(form(f.category, "C")).await.unwrap();

        let result = f.service.move_app(c.id, Some(a.id)).await.unwrap();

        assert_eq!(
            result.order.iter().map(|u| u.id).collect::<Vec<_>>(),
            vec![c.id, a.id, b.id]
        );
        let titles: Vec<String> = f
            .service
            .list(Some(f.category))
            .await
            .unwrap()
            .into_iter()
            .map(|app| app.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_delete_unknown_app() {
        let f = fixture().await;
        let err = f.service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_app_leaves_sibling_positions() {
        let f = fixture().await;
        let a = f.service.create(form(f.category, "A")).await.unwrap();
        let b = f.service.create(form(f.category, "B")).await.unwrap();
        let c = f.service.create(form(f.category, "C")).await.unwrap();

        f.service.delete(b.id).await.unwrap();

        let remaining: Vec<(Uuid, i32)> = f
            .service
            .list(Some(f.category))
            .await
            .unwrap()
            .into_iter()
            .map(|app| (app.id, app.display_order))
            .collect();
        assert_eq!(remaining, vec![(a.id, 0), (c.id, 2)]);
        assert!(matches!(
            f.service.delete(b.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
