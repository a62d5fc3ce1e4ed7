use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::apps::models::{App, AppPatch, AppWithCategory};
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};

/// Response DTO for an app in the admin panel
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppResponseDto {
    pub id: Uuid,
    pub title: String,
    pub creator: String,
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    pub display_order: i32,
    pub image_url: String,
    pub product_image_url: Option<String>,
    pub download_url: Option<String>,
    pub downloads: i64,
    pub badge_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AppResponseDto {
    fn build(app: App, category_name: Option<String>) -> Self {
        Self {
            id: app.id,
            title: app.title,
            creator: app.creator,
            price: app.price,
            description: app.description,
            category_id: app.category_id,
            category_name,
            display_order: app.display_order,
            image_url: app.image_url,
            product_image_url: app.product_image_url,
            download_url: app.download_url,
            downloads: app.downloads,
            badge_text: app.badge_text,
            created_at: app.created_at,
        }
    }
}

impl From<AppWithCategory> for AppResponseDto {
    fn from(entry: AppWithCategory) -> Self {
        Self::build(entry.app, entry.category_name)
    }
}

impl From<App> for AppResponseDto {
    fn from(app: App) -> Self {
        Self::build(app, None)
    }
}

/// Query params for listing apps
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListAppsQuery {
    /// Only apps of this category
    pub category_id: Option<Uuid>,
}

/// Multipart form for creating or updating an app
/// Note: This struct is for Swagger UI documentation only.
/// The handlers read the form with axum's Multipart extractor.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct AppFormDocDto {
    pub title: Option<String>,
    pub creator: Option<String>,
    #[schema(example = "Free")]
    pub price: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub download_url: Option<String>,
    pub badge_text: Option<String>,
    /// Card image, required on create
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
    /// Detail image shown on the app page
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub product_image: Option<String>,
}

/// An image part read from a multipart form
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    /// Check type and size against the upload limits
    pub fn validate(&self, field: &str) -> Result<()> {
        if self.data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::Validation(format!(
                "{} is too large. Maximum size is {} MB",
                field,
                MAX_IMAGE_SIZE / 1024 / 1024
            )));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::Validation(format!(
                "{} type '{}' is not allowed. Allowed types: {}",
                field,
                self.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        Ok(())
    }
}

/// Fields of an app form as submitted. `None` means the field was not sent.
#[derive(Debug, Clone, Default)]
pub struct AppForm {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub price: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub download_url: Option<String>,
    pub badge_text: Option<String>,
    pub image: Option<UploadedImage>,
    pub product_image: Option<UploadedImage>,
}

impl AppForm {
    /// Parse the submitted category id
    pub fn parsed_category_id(&self) -> Result<Option<Uuid>> {
        match self.category_id.as_deref().filter(|s| !s.is_empty()) {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| AppError::Validation(format!("Invalid category_id '{}'", raw))),
        }
    }
}

/// Text fields of a new app after normalization
#[derive(Debug, Clone, Validate)]
pub struct CreateAppDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 200, message = "creator must be 1-200 characters"))]
    pub creator: String,
    #[validate(length(min = 1, max = 50, message = "price must be 1-50 characters"))]
    pub price: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    #[validate(url(message = "download_url must be a valid URL"))]
    pub download_url: Option<String>,
    #[validate(length(max = 50, message = "badge_text must be at most 50 characters"))]
    pub badge_text: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

impl TryFrom<&AppForm> for CreateAppDto {
    type Error = AppError;

    fn try_from(form: &AppForm) -> Result<Self> {
        let required = |value: &Option<String>, name: &str| {
            non_empty(value.clone())
                .ok_or_else(|| AppError::Validation(format!("{} is required", name)))
        };

        let dto = Self {
            title: required(&form.title, "title")?,
            creator: required(&form.creator, "creator")?,
            price: required(&form.price, "price")?,
            description: non_empty(form.description.clone()),
            category_id: form
                .parsed_category_id()?
                .ok_or_else(|| AppError::Validation("category_id is required".to_string()))?,
            download_url: non_empty(form.download_url.clone()),
            badge_text: non_empty(form.badge_text.clone()),
        };

        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(dto)
    }
}

/// Text fields of an app update. `None` was not sent; `Some(None)` clears the column.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateAppDto {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 200, message = "creator must be 1-200 characters"))]
    pub creator: Option<String>,
    #[validate(length(min = 1, max = 50, message = "price must be 1-50 characters"))]
    pub price: Option<String>,
    pub description: Option<Option<String>>,
    pub category_id: Option<Uuid>,
    #[validate(url(message = "download_url must be a valid URL"))]
    pub download_url: Option<Option<String>>,
    #[validate(length(max = 50, message = "badge_text must be at most 50 characters"))]
    pub badge_text: Option<Option<String>>,
}

impl TryFrom<&AppForm> for UpdateAppDto {
    type Error = AppError;

    fn try_from(form: &AppForm) -> Result<Self> {
        let clearable = |value: &Option<String>| value.clone().map(|v| non_empty(Some(v)));

        let dto = Self {
            title: form.title.clone(),
            creator: form.creator.clone(),
            price: form.price.clone(),
            description: clearable(&form.description),
            category_id: form.parsed_category_id()?,
            download_url: clearable(&form.download_url),
            badge_text: clearable(&form.badge_text),
        };

        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        Ok(dto)
    }
}

impl From<UpdateAppDto> for AppPatch {
    fn from(dto: UpdateAppDto) -> Self {
        Self {
            title: dto.title,
            creator: dto.creator,
            price: dto.price,
            description: dto.description,
            category_id: dto.category_id,
            download_url: dto.download_url,
            badge_text: dto.badge_text,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> AppForm {
        AppForm {
            title: Some("Turbo Racer".to_string()),
            creator: Some("Speed Inc".to_string()),
            price: Some("Free".to_string()),
            category_id: Some(Uuid::new_v4().to_string()),
            description: Some(String::new()),
            ..AppForm::default()
        }
    }

    #[test]
    fn test_create_dto_from_form() {
        let dto = CreateAppDto::try_from(&form()).unwrap();
        assert_eq!(dto.title, "Turbo Racer");
        assert_eq!(dto.description, None);
    }

    #[test]
    fn test_create_dto_requires_fields() {
        let mut missing_title = form();
        missing_title.title = Some(String::new());
        assert!(matches!(
            CreateAppDto::try_from(&missing_title),
            Err(AppError::Validation(_))
        ));

        let mut bad_category = form();
        bad_category.category_id = Some("not-a-uuid".to_string());
        assert!(CreateAppDto::try_from(&bad_category).is_err());

        let mut bad_url = form();
        bad_url.download_url = Some("nope".to_string());
        assert!(CreateAppDto::try_from(&bad_url).is_err());
    }

    #[test]
    fn test_update_dto_applies_create_rules_to_sent_fields() {
        let untouched = UpdateAppDto::try_from(&AppForm::default()).unwrap();
        assert!(untouched.title.is_none());
        assert!(untouched.download_url.is_none());

        let too_long = AppForm {
            title: Some("x".repeat(201)),
            ..AppForm::default()
        };
        assert!(matches!(
            UpdateAppDto::try_from(&too_long),
            Err(AppError::Validation(_))
        ));

        let blank_price = AppForm {
            price: Some(String::new()),
            ..AppForm::default()
        };
        assert!(UpdateAppDto::try_from(&blank_price).is_err());

        let long_badge = AppForm {
            badge_text: Some("b".repeat(51)),
            ..AppForm::default()
        };
        assert!(UpdateAppDto::try_from(&long_badge).is_err());

        let bad_url = AppForm {
            download_url: Some("not a url".to_string()),
            ..AppForm::default()
        };
        assert!(UpdateAppDto::try_from(&bad_url).is_err());
    }

    #[test]
    fn test_update_dto_empty_optional_clears() {
        let form = AppForm {
            description: Some(String::new()),
            badge_text: Some("New".to_string()),
            ..AppForm::default()
        };
        let patch = AppPatch::from(UpdateAppDto::try_from(&form).unwrap());

        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.badge_text, Some(Some("New".to_string())));
        assert_eq!(patch.download_url, None);
    }

    #[test]
    fn test_image_validation() {
        let png = UploadedImage {
            file_name: "card.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0; 16],
        };
        assert!(png.validate("image").is_ok());

        let pdf = UploadedImage {
            content_type: "application/pdf".to_string(),
            ..png.clone()
        };
        assert!(pdf.validate("image").is_err());

        let huge = UploadedImage {
            data: vec![0; MAX_IMAGE_SIZE + 1],
            ..png
        };
        assert!(huge.validate("image").is_err());
    }
}
