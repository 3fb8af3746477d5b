use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{CategoryStore, StoreResult};
use crate::features::categories::error::CategoryError;
use crate::features::categories::models::{
    Category, CategoryFields, CategoryFilter, ParentSummary,
};
use crate::shared::types::PageRequest;

const CATEGORY_COLUMNS: &str = "id, parent_id, name, slug, description, icon, color, \
     sort_order, is_published, status, thumbnail_url, meta_description, article_count, \
     created_at, updated_at";

const SLUG_UNIQUE_CONSTRAINT: &str = "categories_slug_key";
const PARENT_NOT_SELF_CONSTRAINT: &str = "categories_parent_not_self";

/// Advisory lock taken by every transaction that re-parents a category
const HIERARCHY_LOCK_KEY: i64 = 0x7769_6b69_7472_6565;

/// True when the ancestor chain starting at $1 contains $2.
/// `UNION` (not `UNION ALL`) keeps the walk finite even over corrupt data.
const ANCESTOR_CONTAINS_SQL: &str = r#"
    WITH RECURSIVE ancestors AS (
        SELECT id, parent_id FROM categories WHERE id = $1
        UNION
        SELECT c.id, c.parent_id
        FROM categories c
        JOIN ancestors a ON c.id = a.parent_id
    )
    SELECT EXISTS (SELECT 1 FROM ancestors WHERE id = $2)
"#;

/// Convert write failures into category errors with user-facing messages
fn map_write_error(e: sqlx::Error, slug: &str) -> CategoryError {
    if let sqlx::Error::Database(db_err) = &e {
        match db_err.code().as_deref() {
            // unique_violation
            Some("23505") if db_err.constraint() == Some(SLUG_UNIQUE_CONSTRAINT) => {
                return CategoryError::DuplicateSlug(slug.to_string());
            }
            // foreign_key_violation
            Some("23503") => {
                return CategoryError::InvalidParent(
                    "Parent category does not exist".to_string(),
                );
            }
            // check_violation
            Some("23514") if db_err.constraint() == Some(PARENT_NOT_SELF_CONSTRAINT) => {
                return CategoryError::InvalidParent(
                    "A category cannot be its own parent".to_string(),
                );
            }
            _ => {}
        }
    }

    tracing::error!("Category write failed: {:?}", e);
    CategoryError::Store(e)
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503"))
}

/// Escape `%`, `_` and `\` so user input is matched literally by ILIKE
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &CategoryFilter) {
    qb.push(" WHERE TRUE");

    if filter.visible_only {
        qb.push(" AND is_published = TRUE AND status = 'active'");
    }

    if let Some(parent_id) = filter.parent_id {
        qb.push(" AND parent_id = ").push_bind(parent_id);
    }

    if let Some(search) = filter.search.as_deref() {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Bind the editable field set in column order
fn bind_fields(
    query: QueryAs<'_, Postgres, Category, PgArguments>,
    fields: CategoryFields,
) -> QueryAs<'_, Postgres, Category, PgArguments> {
    query
        .bind(fields.parent_id)
        .bind(fields.name)
        .bind(fields.slug)
        .bind(fields.description)
        .bind(fields.icon)
        .bind(fields.color)
        .bind(fields.sort_order)
        .bind(fields.is_published)
        .bind(fields.status)
        .bind(fields.thumbnail_url)
        .bind(fields.meta_description)
}

/// Postgres-backed category store
pub struct PgCategoryStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgCategoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgCategoryStore")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE slug = $1", CATEGORY_COLUMNS);
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    async fn list(
        &self,
        filter: &CategoryFilter,
        page: &PageRequest,
    ) -> StoreResult<(Vec<Category>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM categories");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut page_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM categories", CATEGORY_COLUMNS));
        push_filters(&mut page_query, filter);
        page_query
            .push(" ORDER BY sort_order ASC, name ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let categories = page_query
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;

        Ok((categories, total))
    }

    async fn list_all(&self, visible_only: bool) -> StoreResult<Vec<Category>> {
        let filter = CategoryFilter {
            visible_only,
            ..Default::default()
        };

        let mut query =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM categories", CATEGORY_COLUMNS));
        push_filters(&mut query, &filter);
        query.push(" ORDER BY sort_order ASC, name ASC");

        let categories = query
            .build_query_as::<Category>()
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    async fn insert(&self, fields: CategoryFields) -> StoreResult<Category> {
        let slug = fields.slug.clone();
        let sql = format!(
            r#"
            INSERT INTO categories (parent_id, name, slug, description, icon, color,
                                    sort_order, is_published, status, thumbnail_url, meta_description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        bind_fields(sqlx::query_as::<_, Category>(&sql), fields)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, &slug))
    }

    async fn update_by_id(
        &self,
        id: Uuid,
        fields: CategoryFields,
    ) -> StoreResult<Option<Category>> {
        let slug = fields.slug.clone();
        let new_parent = fields.parent_id;

        let mut tx = self.pool.begin().await?;

        // Serialize hierarchy edits so the cycle check below sees every
        // concurrently committed parent change.
        if new_parent.is_some() {
            sqlx::query("SELECT pg_advisory_xact_lock($1)")
                .bind(HIERARCHY_LOCK_KEY)
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            r#"
            UPDATE categories
            SET parent_id = $2,
                name = $3,
                slug = $4,
                description = $5,
                icon = $6,
                color = $7,
                sort_order = $8,
                is_published = $9,
                status = $10,
                thumbnail_url = $11,
                meta_description = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let updated = bind_fields(sqlx::query_as::<_, Category>(&sql).bind(id), fields)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, &slug))?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        if let Some(parent_id) = new_parent {
            let cyclic: bool = sqlx::query_scalar(ANCESTOR_CONTAINS_SQL)
                .bind(parent_id)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

            if cyclic {
                tx.rollback().await?;
                return Err(CategoryError::CyclicParent);
            }
        }

        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_foreign_key_violation(&e) => {
                Err(CategoryError::HasChildren(self.count_children(id).await?))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_parent_summary(
        &self,
        id: Uuid,
        visible_only: bool,
    ) -> StoreResult<Option<ParentSummary>> {
        let summary = sqlx::query_as::<_, ParentSummary>(
            "SELECT id, name, slug FROM categories WHERE id = $1 \
             AND (NOT $2 OR (is_published = TRUE AND status = 'active'))",
        )
        .bind(id)
        .bind(visible_only)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    async fn parent_summaries(
        &self,
        ids: &[Uuid],
        visible_only: bool,
    ) -> StoreResult<Vec<ParentSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let summaries = sqlx::query_as::<_, ParentSummary>(
            "SELECT id, name, slug FROM categories WHERE id = ANY($1) \
             AND (NOT $2 OR (is_published = TRUE AND status = 'active'))",
        )
        .bind(ids.to_vec())
        .bind(visible_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(summaries)
    }

    async fn count_children(&self, id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn adjust_article_count(&self, id: Uuid, delta: i32) -> StoreResult<Option<Category>> {
        let sql = format!(
            r#"
            UPDATE categories
            SET article_count = GREATEST(LEAST(article_count::bigint + $2, 2147483647), 0)::int
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        );

        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }
}
