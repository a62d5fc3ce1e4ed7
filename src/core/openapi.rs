use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::apps::{dtos as apps_dtos, handlers as apps_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::downloads::{dtos as downloads_dtos, handlers as downloads_handlers};
use crate::features::ordering::{self, dtos as ordering_dtos};
use crate::features::storefront::{dtos as storefront_dtos, handlers as storefront_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Storefront (public)
        storefront_handlers::get_storefront,
        storefront_handlers::get_app,
        storefront_handlers::realtime,
        // Downloads (public)
        downloads_handlers::download,
        downloads_handlers::get_file_size,
        // Admin
        admin_handlers::get_stats,
        // Admin categories
        categories_handlers::list_categories,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        categories_handlers::reorder_categories,
        categories_handlers::move_category,
        // Admin apps
        apps_handlers::list_apps,
        apps_handlers::create_app,
        apps_handlers::update_app,
        apps_handlers::delete_app,
        apps_handlers::reorder_apps,
        apps_handlers::move_app,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Ordering
            ordering::OrderUpdate,
            ordering::PersistReport,
            ordering_dtos::ReorderRequestDto,
            ordering_dtos::MoveRequestDto,
            ordering_dtos::MoveResultDto,
            ApiResponse<ordering::PersistReport>,
            ApiResponse<ordering_dtos::MoveResultDto>,
            // Storefront
            storefront_dtos::StorefrontAppDto,
            storefront_dtos::StorefrontCategoryDto,
            storefront_dtos::AppDetailDto,
            ApiResponse<Vec<storefront_dtos::StorefrontCategoryDto>>,
            ApiResponse<storefront_dtos::AppDetailDto>,
            // Downloads
            downloads_dtos::FileSizeDto,
            ApiResponse<downloads_dtos::FileSizeDto>,
            // Admin
            admin_dtos::AdminStatsDto,
            ApiResponse<admin_dtos::AdminStatsDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Apps
            apps_dtos::AppResponseDto,
            apps_dtos::AppFormDocDto,
            ApiResponse<Vec<apps_dtos::AppResponseDto>>,
            ApiResponse<apps_dtos::AppResponseDto>,
        )
    ),
    tags(
        (name = "storefront", description = "Public catalog and live updates"),
        (name = "downloads", description = "Download tracking and file size probing (public)"),
        (name = "admin", description = "Admin dashboard"),
        (name = "admin-categories", description = "Category management (admin only)"),
        (name = "admin-apps", description = "App management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Apps Store API",
        version = "0.1.0",
        description = "API documentation for the apps store",
    )
)]
pub struct ApiDoc;

/// Adds the HTTP Basic scheme guarding `/api/admin`
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
