use std::sync::Arc;

use axum::{extract::State, Json};

use crate::core::error::Result;
use crate::features::admin::dtos::AdminStatsDto;
use crate::features::admin::services::AdminService;
use crate::shared::types::ApiResponse;

/// Dashboard totals
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    responses(
        (status = 200, description = "Catalog totals", body = ApiResponse<AdminStatsDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "admin",
    security(("basic_auth" = []))
)]
pub async fn get_stats(
    State(service): State<Arc<AdminService>>,
) -> Result<Json<ApiResponse<AdminStatsDto>>> {
    let stats = service.stats().await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}
