use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};

use crate::features::apps::handlers;
use crate::features::apps::services::AppService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Room for both images plus the text fields and multipart overhead
const APP_FORM_BODY_LIMIT: usize = 2 * MAX_IMAGE_SIZE + 1024 * 1024;

/// Create admin routes for apps (nested under `/api/admin`)
pub fn admin_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route(
            "/apps",
            get(handlers::list_apps)
                .post(handlers::create_app)
                .layer(DefaultBodyLimit::max(APP_FORM_BODY_LIMIT)),
        )
        .route(
            "/apps/{id}",
            patch(handlers::update_app)
                .delete(handlers::delete_app)
                .layer(DefaultBodyLimit::max(APP_FORM_BODY_LIMIT)),
        )
        .route("/apps/{id}/move", post(handlers::move_app))
        .route("/categories/{id}/apps/order", put(handlers::reorder_apps))
        .with_state(service)
}
