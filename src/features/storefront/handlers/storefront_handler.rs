use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::storefront::dtos::{AppDetailDto, StorefrontCategoryDto, StorefrontQuery};
use crate::features::storefront::services::StorefrontService;
use crate::shared::types::{ApiResponse, Meta};

/// Storefront listing
///
/// Categories in display order with their apps, served from the live catalog.
/// Categories without a matching app are left out.
#[utoipa::path(
    get,
    path = "/api/storefront",
    params(StorefrontQuery),
    responses(
        (status = 200, description = "Categories with apps", body = ApiResponse<Vec<StorefrontCategoryDto>>),
    ),
    tag = "storefront"
)]
pub async fn get_storefront(
    State(service): State<Arc<StorefrontService>>,
    Query(query): Query<StorefrontQuery>,
) -> Result<Json<ApiResponse<Vec<StorefrontCategoryDto>>>> {
    let categories = service.storefront(query.q.as_deref());
    let total = categories.iter().map(|c| c.apps.len() as i64).sum();
    Ok(Json(ApiResponse::success(
        Some(categories),
        None,
        Some(Meta { total }),
    )))
}

/// Get app detail
#[utoipa::path(
    get,
    path = "/api/apps/{id}",
    params(
        ("id" = Uuid, Path, description = "App ID")
    ),
    responses(
        (status = 200, description = "App found", body = ApiResponse<AppDetailDto>),
        (status = 404, description = "App not found")
    ),
    tag = "storefront"
)]
pub async fn get_app(
    State(service): State<Arc<StorefrontService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AppDetailDto>>> {
    let app = service.get_app(id).await?;
    Ok(Json(ApiResponse::success(Some(app), None, None)))
}
