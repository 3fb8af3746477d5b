use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::{AppJson, AppPath, AppQuery};
use crate::features::auth::guards::{MaybeAuthenticated, RequireAdmin};
use crate::features::categories::dtos::{
    CategoryQueryParams, CategoryResponseDto, CategoryTreeDto, CategoryTreeQueryParams,
    CreateCategoryDto, SlugPreviewDto, SlugPreviewQuery, UpdateCategoryDto,
};
use crate::features::categories::services::CategoryService;
use crate::shared::types::{ApiResponse, ErrorBody};

/// Admins see hidden categories unless they opt out; everyone else never does
fn include_hidden(viewer: &MaybeAuthenticated, requested: Option<bool>) -> bool {
    viewer.is_admin() && requested.unwrap_or(true)
}

/// List categories with search, parent filter and pagination
#[utoipa::path(
    get,
    path = "/api/categories",
    params(CategoryQueryParams),
    responses(
        (status = 200, description = "Page of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
        (status = 400, description = "Invalid query parameters", body = ErrorBody),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    viewer: MaybeAuthenticated,
    State(service): State<Arc<CategoryService>>,
    AppQuery(params): AppQuery<CategoryQueryParams>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let hidden = include_hidden(&viewer, params.include_hidden);
    let (categories, pagination) = service.list(&params, hidden).await?;
    Ok(Json(ApiResponse::paginated(categories, pagination)))
}

/// Categories as a nested tree
#[utoipa::path(
    get,
    path = "/api/categories/tree",
    params(CategoryTreeQueryParams),
    responses(
        (status = 200, description = "Category tree", body = ApiResponse<Vec<CategoryTreeDto>>),
    ),
    tag = "categories"
)]
pub async fn category_tree(
    viewer: MaybeAuthenticated,
    State(service): State<Arc<CategoryService>>,
    AppQuery(params): AppQuery<CategoryTreeQueryParams>,
) -> Result<Json<ApiResponse<Vec<CategoryTreeDto>>>> {
    let tree = service
        .tree(include_hidden(&viewer, params.include_hidden))
        .await?;
    Ok(Json(ApiResponse::success(Some(tree), None)))
}

/// Get category by ID
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Malformed ID", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    tag = "categories"
)]
pub async fn get_category(
    viewer: MaybeAuthenticated,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(id, viewer.is_admin()).await?;
    Ok(Json(ApiResponse::success(Some(category), None)))
}

/// Get category by slug
#[utoipa::path(
    get,
    path = "/api/categories/slug/{slug}",
    params(
        ("slug" = String, Path, description = "Category slug")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    tag = "categories"
)]
pub async fn get_category_by_slug(
    viewer: MaybeAuthenticated,
    State(service): State<Arc<CategoryService>>,
    AppPath(slug): AppPath<String>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_slug(&slug, viewer.is_admin()).await?;
    Ok(Json(ApiResponse::success(Some(category), None)))
}

/// Preview the slug the server derives from a name
#[utoipa::path(
    get,
    path = "/api/categories/slug-preview",
    params(SlugPreviewQuery),
    responses(
        (status = 200, description = "Derived slug", body = ApiResponse<SlugPreviewDto>),
    ),
    tag = "categories"
)]
pub async fn preview_slug(
    AppQuery(query): AppQuery<SlugPreviewQuery>,
) -> Result<Json<ApiResponse<SlugPreviewDto>>> {
    let preview = CategoryService::preview_slug(&query.name);
    Ok(Json(ApiResponse::success(Some(preview), None)))
}

/// Create a category (admin only)
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error or duplicate slug", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Forbidden - admin only", body = ErrorBody)
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_category(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    AppJson(dto): AppJson<CreateCategoryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponseDto>>)> {
    let category = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(category),
            Some("Category created successfully".to_string()),
        )),
    ))
}

/// Replace a category's editable fields (admin only)
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error, duplicate slug or invalid parent", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Forbidden - admin only", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_category(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category updated successfully".to_string()),
    )))
}

/// Delete a category without children (admin only)
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 400, description = "Malformed ID", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 403, description = "Forbidden - admin only", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody),
        (status = 409, description = "Category still has children", body = ErrorBody)
    ),
    tag = "categories",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_category(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<CategoryService>>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&user, id).await?;
    Ok(Json(ApiResponse::message("Category deleted successfully")))
}
