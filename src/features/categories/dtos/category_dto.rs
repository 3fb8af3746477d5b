use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::{Category, CategoryStatus, ParentSummary};
use crate::shared::validation::{not_blank, HEX_COLOR_REGEX};

/// Trim a string field, treating blank input as absent
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Create request. Only `name` and `description` are required; an omitted
/// slug is derived from the name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    #[serde(default)]
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,

    #[validate(length(max = 200))]
    pub slug: Option<String>,

    #[serde(default)]
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub description: String,

    /// Emoji or short symbol, defaults to a folder
    #[validate(length(max = 32))]
    pub icon: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "must be a hex color such as #2563EB"))]
    pub color: Option<String>,

    pub parent_id: Option<Uuid>,

    #[validate(range(min = 0, max = 10000))]
    pub order: Option<i32>,

    pub is_published: Option<bool>,

    pub status: Option<CategoryStatus>,

    #[validate(url)]
    pub thumbnail_url: Option<String>,

    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
}

impl CreateCategoryDto {
    /// Trim text fields and drop blank optional values
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            slug: clean(self.slug),
            description: self.description.trim().to_string(),
            icon: clean(self.icon),
            color: clean(self.color),
            thumbnail_url: clean(self.thumbnail_url),
            meta_description: clean(self.meta_description),
            ..self
        }
    }
}

/// Full-record update request; replaces every editable field
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    #[serde(default)]
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 200), custom(function = "not_blank"))]
    pub slug: String,

    #[serde(default)]
    #[validate(length(max = 2000), custom(function = "not_blank"))]
    pub description: String,

    #[validate(length(max = 32))]
    pub icon: Option<String>,

    #[validate(regex(path = *HEX_COLOR_REGEX, message = "must be a hex color such as #2563EB"))]
    pub color: Option<String>,

    pub parent_id: Option<Uuid>,

    #[validate(range(min = 0, max = 10000))]
    pub order: Option<i32>,

    pub is_published: Option<bool>,

    pub status: Option<CategoryStatus>,

    #[validate(url)]
    pub thumbnail_url: Option<String>,

    #[validate(length(max = 160))]
    pub meta_description: Option<String>,
}

impl UpdateCategoryDto {
    /// Trim text fields and drop blank optional values
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            slug: self.slug.trim().to_string(),
            description: self.description.trim().to_string(),
            icon: clean(self.icon),
            color: clean(self.color),
            thumbnail_url: clean(self.thumbnail_url),
            meta_description: clean(self.meta_description),
            ..self
        }
    }
}

/// Query params for listing categories
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryQueryParams {
    /// Case-insensitive match on name or description
    pub search: Option<String>,

    /// Page number (1-indexed, default: 1)
    #[param(minimum = 1)]
    pub page: Option<i64>,

    /// Items per page (default: 100, max: 100)
    #[param(minimum = 1, maximum = 100)]
    pub limit: Option<i64>,

    /// Only direct children of this category
    pub parent_id: Option<Uuid>,

    /// Admins only: include unpublished or inactive categories (default: true for admins)
    pub include_hidden: Option<bool>,
}

/// Query params for the tree endpoint
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CategoryTreeQueryParams {
    /// Admins only: include unpublished or inactive categories (default: true for admins)
    pub include_hidden: Option<bool>,
}

/// Query params for the slug preview endpoint
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SlugPreviewQuery {
    /// Display name to derive the slug from
    #[serde(default)]
    pub name: String,
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParentSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<ParentSummary> for ParentSummaryDto {
    fn from(p: ParentSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
        }
    }
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub parent_id: Option<Uuid>,
    /// Shallow parent reference for display
    pub parent: Option<ParentSummaryDto>,
    pub order: i32,
    pub is_published: bool,
    pub status: CategoryStatus,
    pub thumbnail_url: Option<String>,
    pub meta_description: Option<String>,
    pub article_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CategoryResponseDto {
    pub fn with_parent(c: Category, parent: Option<ParentSummary>) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            icon: c.icon,
            color: c.color,
            parent_id: c.parent_id,
            parent: parent.map(ParentSummaryDto::from),
            order: c.sort_order,
            is_published: c.is_published,
            status: c.status,
            thumbnail_url: c.thumbnail_url,
            meta_description: c.meta_description,
            article_count: c.article_count,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self::with_parent(c, None)
    }
}

/// Response DTO for category tree (hierarchical structure)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(no_recursion)]
pub struct CategoryTreeDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub order: i32,
    pub article_count: i32,
    pub children: Vec<CategoryTreeDto>,
}

impl CategoryTreeDto {
    /// Build tree from a flat list of categories in listing order.
    ///
    /// Categories whose parent is not in the list are left out together with
    /// their subtree, so hiding a category hides its descendants too.
    pub fn build_tree(categories: Vec<Category>) -> Vec<CategoryTreeDto> {
        categories
            .iter()
            .filter(|c| c.parent_id.is_none())
            .map(|root| Self::build_node(root, &categories))
            .collect()
    }

    fn build_node(category: &Category, all_categories: &[Category]) -> CategoryTreeDto {
        let children: Vec<CategoryTreeDto> = all_categories
            .iter()
            .filter(|c| c.parent_id == Some(category.id))
            .map(|child| Self::build_node(child, all_categories))
            .collect();

        CategoryTreeDto {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            order: category.sort_order,
            article_count: category.article_count,
            children,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SlugPreviewDto {
    pub slug: String,
}
