use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::apps::dtos::{
    AppForm, AppFormDocDto, AppResponseDto, ListAppsQuery, UploadedImage,
};
use crate::features::apps::services::AppService;
use crate::features::ordering::dtos::{MoveRequestDto, MoveResultDto, ReorderRequestDto};
use crate::features::ordering::PersistReport;
use crate::shared::types::{ApiResponse, Meta};

/// Read the app form fields. Empty file inputs count as not sent.
async fn read_app_form(mut multipart: Multipart) -> Result<AppForm> {
    let mut form = AppForm::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" | "product_image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {}: {}", field_name, e))
                })?;

                if data.is_empty() {
                    continue;
                }

                let image = UploadedImage {
                    file_name: if file_name.is_empty() {
                        "image".to_string()
                    } else {
                        file_name
                    },
                    content_type,
                    data: data.to_vec(),
                };
                if field_name == "image" {
                    form.image = Some(image);
                } else {
                    form.product_image = Some(image);
                }
            }
            "title" | "creator" | "price" | "description" | "category_id" | "download_url"
            | "badge_text" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {} field: {}", field_name, e))
                })?;
                let value = Some(text.trim().to_string());
                match field_name.as_str() {
                    "title" => form.title = value,
                    "creator" => form.creator = value,
                    "price" => form.price = value,
                    "description" => form.description = value,
                    "category_id" => form.category_id = value,
                    "download_url" => form.download_url = value,
                    _ => form.badge_text = value,
                }
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(form)
}

/// List apps, optionally of one category
#[utoipa::path(
    get,
    path = "/api/admin/apps",
    params(ListAppsQuery),
    responses(
        (status = 200, description = "List of apps", body = ApiResponse<Vec<AppResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn list_apps(
    State(service): State<Arc<AppService>>,
    Query(query): Query<ListAppsQuery>,
) -> Result<Json<ApiResponse<Vec<AppResponseDto>>>> {
    let apps = service.list(query.category_id).await?;
    let total = apps.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(apps),
        None,
        Some(Meta { total }),
    )))
}

/// Create an app
///
/// Accepts multipart/form-data. `image` (the card image) is required;
/// `product_image` is optional.
#[utoipa::path(
    post,
    path = "/api/admin/apps",
    request_body(
        content = AppFormDocDto,
        content_type = "multipart/form-data",
        description = "App fields with card and product images",
    ),
    responses(
        (status = 201, description = "App created", body = ApiResponse<AppResponseDto>),
        (status = 400, description = "Missing card image or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Image upload failed")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn create_app(
    State(service): State<Arc<AppService>>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<AppResponseDto>>)> {
    let form = read_app_form(multipart).await?;
    let app = service.create(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(app),
            Some("App created".to_string()),
            None,
        )),
    ))
}

/// Update an app
///
/// Only the fields sent are changed. A failed image upload keeps the current image.
#[utoipa::path(
    patch,
    path = "/api/admin/apps/{id}",
    params(("id" = Uuid, Path, description = "App ID")),
    request_body(
        content = AppFormDocDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "App updated", body = ApiResponse<AppResponseDto>),
        (status = 400, description = "Invalid fields"),
        (status = 404, description = "App not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn update_app(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<AppResponseDto>>> {
    let form = read_app_form(multipart).await?;
    let app = service.update(id, form).await?;
    Ok(Json(ApiResponse::success(Some(app), None, None)))
}

/// Delete an app
#[utoipa::path(
    delete,
    path = "/api/admin/apps/{id}",
    params(("id" = Uuid, Path, description = "App ID")),
    responses(
        (status = 204, description = "App deleted"),
        (status = 404, description = "App not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn delete_app(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Persist the order of the apps in one category
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}/apps/order",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = ReorderRequestDto,
    responses(
        (status = 200, description = "Per-item outcome", body = ApiResponse<PersistReport>),
        (status = 400, description = "Invalid order"),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn reorder_apps(
    State(service): State<Arc<AppService>>,
    Path(category_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<ReorderRequestDto>,
) -> Result<Json<ApiResponse<PersistReport>>> {
    let report = service.reorder(category_id, dto.items).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Drop an app onto another app of the same category
#[utoipa::path(
    post,
    path = "/api/admin/apps/{id}/move",
    params(("id" = Uuid, Path, description = "Dragged app ID")),
    request_body = MoveRequestDto,
    responses(
        (status = 200, description = "New order of the category", body = ApiResponse<MoveResultDto>),
        (status = 404, description = "App not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-apps",
    security(("basic_auth" = []))
)]
pub async fn move_app(
    State(service): State<Arc<AppService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<MoveRequestDto>,
) -> Result<Json<ApiResponse<MoveResultDto>>> {
    let result = service.move_app(id, dto.target_id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
