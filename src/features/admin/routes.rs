use std::sync::Arc;

use axum::{middleware::from_fn, routing::get, Router};

use crate::core::middleware::basic_auth_middleware;
use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;
use crate::features::apps::routes as apps_routes;
use crate::features::apps::AppService;
use crate::features::categories::routes as categories_routes;
use crate::features::categories::CategoryService;

/// Realm shown by browsers for the admin login prompt
const ADMIN_REALM: &str = "admin";

/// Create admin routes (all behind HTTP Basic auth), to be nested under `/api/admin`
pub fn routes(
    admin_service: Arc<AdminService>,
    category_service: Arc<CategoryService>,
    app_service: Arc<AppService>,
    credentials: Arc<String>,
) -> Router {
    Router::new()
        .route("/stats", get(handlers::get_stats))
        .with_state(admin_service)
        .merge(categories_routes::admin_routes(category_service))
        .merge(apps_routes::admin_routes(app_service))
        .route_layer(from_fn(basic_auth_middleware(credentials, ADMIN_REALM)))
}
