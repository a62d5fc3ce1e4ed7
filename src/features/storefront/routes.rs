use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::storefront::handlers;
use crate::features::storefront::services::StorefrontService;

/// Create routes for the storefront feature
///
/// Note: This feature is public (no authentication required)
pub fn routes(service: Arc<StorefrontService>) -> Router {
    Router::new()
        .route("/api/storefront", get(handlers::get_storefront))
        .route("/api/apps/{id}", get(handlers::get_app))
        .route("/api/realtime", get(handlers::realtime))
        .with_state(service)
}
