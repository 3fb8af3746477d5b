//! Durable persistence for categories.
//!
//! Stores are the authoritative guard for the tree invariants: slug
//! uniqueness, parent existence and acyclicity are re-checked at write time,
//! so concurrent requests cannot slip past the service's pre-checks.

mod postgres;

#[cfg(test)]
mod memory;

pub use postgres::PgCategoryStore;

#[cfg(test)]
pub use memory::InMemoryCategoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::features::categories::error::CategoryError;
use crate::features::categories::models::{
    Category, CategoryFields, CategoryFilter, ParentSummary,
};
use crate::shared::types::PageRequest;

pub type StoreResult<T> = std::result::Result<T, CategoryError>;

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>>;

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Category>>;

    /// One page of matching categories ordered by `sort_order`, then `name`,
    /// together with the total number of matches.
    async fn list(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Category>, i64)>;

    /// Every category, in listing order
    async fn list_all(&self, visible_only: bool) -> StoreResult<Vec<Category>>;

    /// Fails with `DuplicateSlug` or `InvalidParent`
    async fn insert(&self, fields: CategoryFields) -> StoreResult<Category>;

    /// Replace the editable fields. `Ok(None)` when `id` does not exist.
    ///
    /// Fails with `DuplicateSlug`, `InvalidParent` or `CyclicParent`.
    async fn update_by_id(&self, id: Uuid, fields: CategoryFields)
        -> StoreResult<Option<Category>>;

    /// `Ok(false)` when `id` does not exist; `HasChildren` while children remain
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;

    /// With `visible_only`, hidden parents resolve to `None`
    async fn resolve_parent_summary(
        &self,
        id: Uuid,
        visible_only: bool,
    ) -> StoreResult<Option<ParentSummary>>;

    /// Batch form of [`CategoryStore::resolve_parent_summary`]
    async fn parent_summaries(
        &self,
        ids: &[Uuid],
        visible_only: bool,
    ) -> StoreResult<Vec<ParentSummary>>;

    async fn count_children(&self, id: Uuid) -> StoreResult<i64>;

    /// Add `delta` to the denormalized article count, never going below zero
    async fn adjust_article_count(&self, id: Uuid, delta: i32) -> StoreResult<Option<Category>>;
}
