use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CategoryStore, StoreResult};
use crate::features::categories::error::CategoryError;
use crate::features::categories::models::{
    Category, CategoryFields, CategoryFilter, ParentSummary,
};
use crate::shared::types::PageRequest;

/// Lock-guarded map store used by tests.
///
/// Every write validates slug uniqueness, parent existence and acyclicity
/// while holding the write lock, mirroring the database constraints.
#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    rows: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }
}

fn matches(filter: &CategoryFilter, category: &Category) -> bool {
    if filter.visible_only && !category.is_publicly_visible() {
        return false;
    }

    if let Some(parent_id) = filter.parent_id {
        if category.parent_id != Some(parent_id) {
            return false;
        }
    }

    match filter.search.as_deref() {
        Some(needle) => {
            let needle = needle.to_lowercase();
            category.name.to_lowercase().contains(&needle)
                || category.description.to_lowercase().contains(&needle)
        }
        None => true,
    }
}

fn sorted(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
    categories
}

fn check_slug_free(
    rows: &HashMap<Uuid, Category>,
    slug: &str,
    except: Option<Uuid>,
) -> StoreResult<()> {
    let taken = rows
        .values()
        .any(|c| c.slug == slug && Some(c.id) != except);
    if taken {
        return Err(CategoryError::DuplicateSlug(slug.to_string()));
    }
    Ok(())
}

fn check_parent_exists(rows: &HashMap<Uuid, Category>, parent_id: Option<Uuid>) -> StoreResult<()> {
    match parent_id {
        Some(parent_id) if !rows.contains_key(&parent_id) => {
            Err(CategoryError::parent_not_found(parent_id))
        }
        _ => Ok(()),
    }
}

/// Walk up from `parent_id`; reaching `id` means the assignment closes a loop
fn closes_cycle(rows: &HashMap<Uuid, Category>, id: Uuid, parent_id: Uuid) -> bool {
    let mut current = Some(parent_id);
    let mut steps = 0;
    while let Some(node) = current {
        if node == id {
            return true;
        }
        steps += 1;
        if steps > rows.len() {
            // the existing data already loops; refuse to extend it
            return true;
        }
        current = rows.get(&node).and_then(|c| c.parent_id);
    }
    false
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        Ok(self
            .rows
            .read()
            .await
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Category>, i64)> {
        let rows = self.rows.read().await;
        let matching = sorted(rows.values().filter(|c| matches(filter, c)).cloned().collect());
        let total = matching.len() as i64;

        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit() as usize)
            .collect();

        Ok((items, total))
    }

    async fn list_all(&self, visible_only: bool) -> StoreResult<Vec<Category>> {
        let filter = CategoryFilter {
            visible_only,
            ..Default::default()
        };
        let rows = self.rows.read().await;
        Ok(sorted(
            rows.values().filter(|c| matches(&filter, c)).cloned().collect(),
        ))
    }

    async fn insert(&self, fields: CategoryFields) -> StoreResult<Category> {
        let mut rows = self.rows.write().await;
        check_slug_free(&rows, &fields.slug, None)?;
        check_parent_exists(&rows, fields.parent_id)?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4(),
            parent_id: fields.parent_id,
            name: fields.name,
            slug: fields.slug,
            description: fields.description,
            icon: fields.icon,
            color: fields.color,
            sort_order: fields.sort_order,
            is_published: fields.is_published,
            status: fields.status,
            thumbnail_url: fields.thumbnail_url,
            meta_description: fields.meta_description,
            article_count: 0,
            created_at: now,
            updated_at: now,
        };

        rows.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> StoreResult<Option<Category>> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Ok(None);
        }

        check_slug_free(&rows, &fields.slug, Some(id))?;
        check_parent_exists(&rows, fields.parent_id)?;
        if let Some(parent_id) = fields.parent_id {
            if parent_id == id {
                return Err(CategoryError::InvalidParent(
                    "A category cannot be its own parent".to_string(),
                ));
            }
            if closes_cycle(&rows, id, parent_id) {
                return Err(CategoryError::CyclicParent);
            }
        }

        let Some(category) = rows.get_mut(&id) else {
            return Ok(None);
        };
        category.parent_id = fields.parent_id;
        category.name = fields.name;
        category.slug = fields.slug;
        category.description = fields.description;
        category.icon = fields.icon;
        category.color = fields.color;
        category.sort_order = fields.sort_order;
        category.is_published = fields.is_published;
        category.status = fields.status;
        category.thumbnail_url = fields.thumbnail_url;
        category.meta_description = fields.meta_description;
        category.updated_at = Utc::now();

        Ok(Some(category.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut rows = self.rows.write().await;
        if !rows.contains_key(&id) {
            return Ok(false);
        }

        let children = rows.values().filter(|c| c.parent_id == Some(id)).count() as i64;
        if children > 0 {
            return Err(CategoryError::HasChildren(children));
        }

        Ok(rows.remove(&id).is_some())
    }

    async fn resolve_parent_summary(
        &self,
        id: Uuid,
        visible_only: bool,
    ) -> StoreResult<Option<ParentSummary>> {
        Ok(self
            .rows
            .read()
            .await
            .get(&id)
            .filter(|c| !visible_only || c.is_publicly_visible())
            .map(ParentSummary::from))
    }

    async fn parent_summaries(
        &self,
        ids: &[Uuid],
        visible_only: bool,
    ) -> StoreResult<Vec<ParentSummary>> {
        let rows = self.rows.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(id))
            .filter(|c| !visible_only || c.is_publicly_visible())
            .map(ParentSummary::from)
            .collect())
    }

    async fn count_children(&self, id: Uuid) -> StoreResult<i64> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|c| c.parent_id == Some(id)).count() as i64)
    }

    async fn adjust_article_count(&self, id: Uuid, delta: i32) -> StoreResult<Option<Category>> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|category| {
            category.article_count = category.article_count.saturating_add(delta).max(0);
            category.clone()
        }))
    }
}
