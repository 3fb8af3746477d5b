use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Category lifecycle status matching the `category_status` database enum
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "category_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

impl std::fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryStatus::Active => write!(f, "active"),
            CategoryStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Database model for category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub sort_order: i32,
    pub is_published: bool,
    pub status: CategoryStatus,
    pub thumbnail_url: Option<String>,
    pub meta_description: Option<String>,
    pub article_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Whether readers outside the admin console may see this category.
    ///
    /// Both flags must allow it: the category is published and active.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_published && self.status == CategoryStatus::Active
    }
}

/// The caller-editable field set, already validated and defaulted.
///
/// Used for both insert and full-record update; `article_count`, `id` and
/// timestamps are owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFields {
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub sort_order: i32,
    pub is_published: bool,
    pub status: CategoryStatus,
    pub thumbnail_url: Option<String>,
    pub meta_description: Option<String>,
}

/// One-level parent reference shown alongside a category
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ParentSummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for ParentSummary {
    fn from(c: &Category) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

/// Filters for listing categories
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring match on name or description
    pub search: Option<String>,
    pub parent_id: Option<Uuid>,
    /// Restrict to published, active categories
    pub visible_only: bool,
}
