use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, ValidatedJson};
use crate::features::categories::dtos::{
    CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::features::ordering::dtos::{MoveRequestDto, MoveResultDto, ReorderRequestDto};
use crate::features::ordering::PersistReport;
use crate::shared::types::{ApiResponse, Meta};

/// List categories in display order
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list().await?;
    let total = categories.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Create a category
///
/// The slug is derived from the name and the category goes to the end of the list.
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Invalid name"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let category = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created".to_string()),
            None,
        )),
    ))
}

/// Rename a category
#[utoipa::path(
    patch,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category renamed", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.rename(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// Delete a category and all of its apps
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Persist a full category order
///
/// Every item is written independently; failures are listed in the report.
#[utoipa::path(
    put,
    path = "/api/admin/categories/order",
    request_body = ReorderRequestDto,
    responses(
        (status = 200, description = "Per-item outcome", body = ApiResponse<PersistReport>),
        (status = 400, description = "Invalid order"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn reorder_categories(
    State(service): State<Arc<CategoryService>>,
    ValidatedJson(dto): ValidatedJson<ReorderRequestDto>,
) -> Result<Json<ApiResponse<PersistReport>>> {
    let report = service.reorder(dto.items).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Drop a category onto another one
///
/// The dragged category takes the target's position and the list is renumbered from 0.
#[utoipa::path(
    post,
    path = "/api/admin/categories/{id}/move",
    params(("id" = Uuid, Path, description = "Dragged category ID")),
    request_body = MoveRequestDto,
    responses(
        (status = 200, description = "New order", body = ApiResponse<MoveResultDto>),
        (status = 404, description = "Category not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin-categories",
    security(("basic_auth" = []))
)]
pub async fn move_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<MoveRequestDto>,
) -> Result<Json<ApiResponse<MoveResultDto>>> {
    let result = service.move_category(id, dto.target_id).await?;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
