use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::core::config::CategoryDefaults;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{
    CategoryQueryParams, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto, SlugPreviewDto,
    UpdateCategoryDto,
};
use crate::features::categories::error::{CategoryError, CategoryResult};
use crate::features::categories::models::{Category, CategoryFields, CategoryFilter};
use crate::features::categories::store::CategoryStore;
use crate::shared::slug::slugify;
use crate::shared::types::{PageRequest, Pagination};
use crate::shared::validation::first_field_error;

fn validate(dto: &impl Validate) -> CategoryResult<()> {
    dto.validate().map_err(|errors| {
        let (field, message) = first_field_error(&errors);
        CategoryError::validation(field, message)
    })
}

fn ensure_admin(actor: &AuthenticatedUser, action: &'static str) -> CategoryResult<()> {
    if !actor.is_admin() {
        tracing::warn!(actor = %actor.user_id, action, "Non-admin category mutation rejected");
        return Err(CategoryError::Forbidden(action));
    }
    Ok(())
}

/// Canonical slug for `raw`, attributed to `field` when nothing URL-safe is left
fn canonical_slug(field: &str, raw: &str) -> CategoryResult<String> {
    let slug = slugify(raw);
    if slug.is_empty() {
        return Err(CategoryError::validation(
            field,
            format!("{} must contain at least one letter or digit", field),
        ));
    }
    Ok(slug)
}

/// Business rules for the category hierarchy.
///
/// The store re-checks slug uniqueness, parent existence and acyclicity when
/// it writes; the lookups here only produce early, field-mapped errors.
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    defaults: CategoryDefaults,
}

impl std::fmt::Debug for CategoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryService")
            .field("store", &"<CategoryStore>")
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>, defaults: CategoryDefaults) -> Self {
        Self { store, defaults }
    }

    /// Slug the server would derive for `name`
    pub fn preview_slug(name: &str) -> SlugPreviewDto {
        SlugPreviewDto {
            slug: slugify(name),
        }
    }

    /// Create a category. An omitted slug is derived from the name.
    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateCategoryDto,
    ) -> CategoryResult<CategoryResponseDto> {
        ensure_admin(actor, "create")?;
        let dto = dto.normalized();
        validate(&dto)?;

        let slug = match dto.slug.as_deref() {
            Some(slug) => canonical_slug("slug", slug)?,
            None => canonical_slug("name", &dto.name)?,
        };

        if self.store.find_by_slug(&slug).await?.is_some() {
            return Err(CategoryError::DuplicateSlug(slug));
        }

        if let Some(parent_id) = dto.parent_id {
            if self.store.find_by_id(parent_id).await?.is_none() {
                return Err(CategoryError::parent_not_found(parent_id));
            }
        }

        let fields = CategoryFields {
            parent_id: dto.parent_id,
            name: dto.name,
            slug,
            description: dto.description,
            icon: dto.icon.unwrap_or_else(|| self.defaults.icon.clone()),
            color: dto.color.unwrap_or_else(|| self.defaults.color.clone()),
            sort_order: dto.order.unwrap_or(0),
            is_published: dto.is_published.unwrap_or(true),
            status: dto.status.unwrap_or_default(),
            thumbnail_url: dto.thumbnail_url,
            meta_description: dto.meta_description,
        };

        let category = self.store.insert(fields).await?;
        tracing::info!(
            category_id = %category.id,
            slug = %category.slug,
            actor = %actor.user_id,
            "Category created"
        );

        self.with_parent(category, true).await
    }

    /// Replace the editable fields of an existing category
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        dto: UpdateCategoryDto,
    ) -> CategoryResult<CategoryResponseDto> {
        ensure_admin(actor, "update")?;
        let dto = dto.normalized();
        validate(&dto)?;

        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CategoryError::not_found(id))?;

        let slug = canonical_slug("slug", &dto.slug)?;
        if slug != existing.slug {
            if let Some(other) = self.store.find_by_slug(&slug).await? {
                if other.id != id {
                    return Err(CategoryError::DuplicateSlug(slug));
                }
            }
        }

        if dto.parent_id != existing.parent_id {
            if let Some(parent_id) = dto.parent_id {
                self.check_parent_assignment(id, parent_id).await?;
            }
        }

        let fields = CategoryFields {
            parent_id: dto.parent_id,
            name: dto.name,
            slug,
            description: dto.description,
            icon: dto.icon.unwrap_or_else(|| self.defaults.icon.clone()),
            color: dto.color.unwrap_or_else(|| self.defaults.color.clone()),
            sort_order: dto.order.unwrap_or(0),
            is_published: dto.is_published.unwrap_or(true),
            status: dto.status.unwrap_or_default(),
            thumbnail_url: dto.thumbnail_url,
            meta_description: dto.meta_description,
        };

        let category = self
            .store
            .update_by_id(id, fields)
            .await?
            .ok_or_else(|| CategoryError::not_found(id))?;

        if category.slug != existing.slug {
            tracing::info!(
                category_id = %id,
                old_slug = %existing.slug,
                new_slug = %category.slug,
                "Category slug changed"
            );
        }
        tracing::info!(category_id = %id, actor = %actor.user_id, "Category updated");

        self.with_parent(category, true).await
    }

    /// Delete a leaf category. Categories with children are kept.
    pub async fn delete(&self, actor: &AuthenticatedUser, id: Uuid) -> CategoryResult<()> {
        ensure_admin(actor, "delete")?;
        if self.store.find_by_id(id).await?.is_none() {
            return Err(CategoryError::not_found(id));
        }

        let children = self.store.count_children(id).await?;
        if children > 0 {
            return Err(CategoryError::HasChildren(children));
        }

        if !self.store.delete_by_id(id).await? {
            return Err(CategoryError::not_found(id));
        }

        tracing::info!(category_id = %id, actor = %actor.user_id, "Category deleted");
        Ok(())
    }

    /// Hidden categories are reported as missing unless `include_hidden` is set
    pub async fn get_by_id(
        &self,
        id: Uuid,
        include_hidden: bool,
    ) -> CategoryResult<CategoryResponseDto> {
        let category = self
            .store
            .find_by_id(id)
            .await?
            .filter(|c| include_hidden || c.is_publicly_visible())
            .ok_or_else(|| CategoryError::not_found(id))?;

        self.with_parent(category, include_hidden).await
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        include_hidden: bool,
    ) -> CategoryResult<CategoryResponseDto> {
        let category = self
            .store
            .find_by_slug(slug)
            .await?
            .filter(|c| include_hidden || c.is_publicly_visible())
            .ok_or_else(|| CategoryError::NotFound(format!("'{}'", slug)))?;

        self.with_parent(category, include_hidden).await
    }

    /// One page of categories plus pagination metadata
    pub async fn list(
        &self,
        params: &CategoryQueryParams,
        include_hidden: bool,
    ) -> CategoryResult<(Vec<CategoryResponseDto>, Pagination)> {
        let filter = CategoryFilter {
            search: params
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            parent_id: params.parent_id,
            visible_only: !include_hidden,
        };
        let page = PageRequest::new(params.page, params.limit);

        let (categories, total) = self.store.list(&filter, &page).await?;

        let parent_ids: Vec<Uuid> = categories
            .iter()
            .filter_map(|c| c.parent_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let parents: HashMap<Uuid, _> = if parent_ids.is_empty() {
            HashMap::new()
        } else {
            self.store
                .parent_summaries(&parent_ids, !include_hidden)
                .await?
                .into_iter()
                .map(|p| (p.id, p))
                .collect()
        };

        let items = categories
            .into_iter()
            .map(|c| {
                let parent = c.parent_id.and_then(|pid| parents.get(&pid).cloned());
                CategoryResponseDto::with_parent(c, parent)
            })
            .collect();

        Ok((items, Pagination::new(&page, total)))
    }

    /// Nested tree ordered by `order`, then `name`
    pub async fn tree(&self, include_hidden: bool) -> CategoryResult<Vec<CategoryTreeDto>> {
        let categories = self.store.list_all(!include_hidden).await?;
        Ok(CategoryTreeDto::build_tree(categories))
    }

    /// Shift the denormalized article count; called by the article subsystem
    /// when articles are published, unpublished or removed.
    #[allow(dead_code)]
    pub async fn adjust_article_count(
        &self,
        id: Uuid,
        delta: i32,
    ) -> CategoryResult<CategoryResponseDto> {
        let category = self
            .store
            .adjust_article_count(id, delta)
            .await?
            .ok_or_else(|| CategoryError::not_found(id))?;

        tracing::debug!(category_id = %id, delta, count = category.article_count, "Article count adjusted");
        Ok(category.into())
    }

    /// Walk up from the proposed parent; meeting `id` means a loop.
    async fn check_parent_assignment(&self, id: Uuid, parent_id: Uuid) -> CategoryResult<()> {
        if parent_id == id {
            return Err(CategoryError::InvalidParent(
                "A category cannot be its own parent".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut current = Some(parent_id);
        while let Some(node_id) = current {
            if node_id == id || !seen.insert(node_id) {
                return Err(CategoryError::CyclicParent);
            }

            match self.store.find_by_id(node_id).await? {
                Some(node) => current = node.parent_id,
                None if node_id == parent_id => {
                    return Err(CategoryError::parent_not_found(parent_id));
                }
                None => break,
            }
        }

        Ok(())
    }

    /// Hidden parents are left out unless `include_hidden` is set
    async fn with_parent(
        &self,
        category: Category,
        include_hidden: bool,
    ) -> CategoryResult<CategoryResponseDto> {
        let parent = match category.parent_id {
            Some(parent_id) => {
                self.store
                    .resolve_parent_summary(parent_id, !include_hidden)
                    .await?
            }
            None => None,
        };
        Ok(CategoryResponseDto::with_parent(category, parent))
    }
}
