use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use uuid::Uuid;

use crate::core::config::DownloadMode;
use crate::core::error::Result;
use crate::features::downloads::dtos::FileSizeDto;
use crate::features::downloads::services::DownloadService;
use crate::shared::types::ApiResponse;

/// Download an app
///
/// Counts the download, then redirects to the source or streams it through,
/// depending on the configured mode.
#[utoipa::path(
    get,
    path = "/api/download/{id}",
    params(("id" = Uuid, Path, description = "App ID")),
    responses(
        (status = 307, description = "Redirect to the download source"),
        (status = 200, description = "Download streamed as an attachment"),
        (status = 404, description = "App not found or no download configured"),
        (status = 502, description = "Download source failed (proxy mode)")
    ),
    tag = "downloads"
)]
pub async fn download(
    State(service): State<Arc<DownloadService>>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let target = service.start(id).await?;

    match service.mode() {
        DownloadMode::Redirect => Ok(Redirect::temporary(&target.url).into_response()),
        DownloadMode::Proxy => service.proxy(&target).await,
    }
}

/// Get the size of an app's download
///
/// Asks the download source; `size` is null when it does not say.
#[utoipa::path(
    get,
    path = "/api/apps/{id}/size",
    params(("id" = Uuid, Path, description = "App ID")),
    responses(
        (status = 200, description = "Download size", body = ApiResponse<FileSizeDto>),
        (status = 404, description = "App not found")
    ),
    tag = "downloads"
)]
pub async fn get_file_size(
    State(service): State<Arc<DownloadService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<FileSizeDto>>> {
    let size = service.file_size(id).await?;
    Ok(Json(ApiResponse::success(
        Some(FileSizeDto::new(id, size)),
        None,
        None,
    )))
}
