use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::downloads::handlers;
use crate::features::downloads::services::DownloadService;

/// Create routes for the downloads feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<DownloadService>) -> Router {
    Router::new()
        .route("/api/download/{id}", get(handlers::download))
        .route("/api/apps/{id}/size", get(handlers::get_file_size))
        .with_state(service)
}
