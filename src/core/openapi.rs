use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{
    dtos as categories_dtos, handlers::category_handler, models as categories_models,
};
use crate::features::health::handlers as health_handlers;
use crate::shared::types::{ApiResponse, ErrorBody, Pagination};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health_handlers::health_check,
        // Categories
        category_handler::list_categories,
        category_handler::category_tree,
        category_handler::get_category,
        category_handler::get_category_by_slug,
        category_handler::preview_slug,
        category_handler::create_category,
        category_handler::update_category,
        category_handler::delete_category,
    ),
    components(
        schemas(
            // Shared
            ErrorBody,
            Pagination,
            // Health
            health_handlers::HealthResponseDto,
            // Categories
            categories_models::CategoryStatus,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            categories_dtos::ParentSummaryDto,
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::SlugPreviewDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            ApiResponse<categories_dtos::SlugPreviewDto>,
        )
    ),
    tags(
        (name = "health", description = "Service liveness"),
        (name = "categories", description = "Wiki category hierarchy (writes are admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Wiki API",
        version = "0.1.0",
        description = "API documentation for the wiki backend",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to the OpenAPI document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
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
