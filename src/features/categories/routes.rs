use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Create admin routes for categories (nested under `/api/admin`)
pub fn admin_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/order", put(handlers::reorder_categories))
        .route(
            "/categories/{id}",
            patch(handlers::update_category).delete(handlers::delete_category),
        )
        .route("/categories/{id}/move", post(handlers::move_category))
        .with_state(service)
}
