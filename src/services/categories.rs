use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{map_unique_violation, ServiceError},
    models::{
        category::{Category, CategoryChanges, CategoryQuery, CategorySummary, NewCategory},
        pagination::Page,
    },
    services::slug::{slugify, unique_slug},
};

const CATEGORY_COLS: &str =
    "c.id, c.name, c.slug, c.description, c.image_url, c.sort_order, c.enabled, c.created_at, c.updated_at";

/// Category columns plus the section summary. The table must be aliased `c`.
fn summary_cols() -> String {
    format!(
        "{CATEGORY_COLS},
         (SELECT COUNT(*) FROM sections s WHERE s.category_id = c.id) AS sections_count,
         ARRAY(SELECT s.name FROM sections s WHERE s.category_id = c.id
               ORDER BY s.sort_order, s.name)::TEXT[] AS section_names"
    )
}

pub struct CategoryService;

impl CategoryService {
    pub async fn list(
        pool: &PgPool,
        query: &CategoryQuery,
        page: Page,
    ) -> Result<(Vec<CategorySummary>, i64), ServiceError> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let filter = "($1::TEXT IS NULL OR c.name ILIKE '%' || $1 || '%')
                      AND ($2::BOOLEAN IS NULL OR c.enabled = $2)";

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM categories c WHERE {filter}"))
                .bind(search)
                .bind(query.enabled)
                .fetch_one(pool)
                .await?;

        let rows = sqlx::query_as::<_, CategorySummary>(&format!(
            "SELECT {} FROM categories c WHERE {filter}
             ORDER BY c.sort_order, c.name
             LIMIT $3 OFFSET $4",
            summary_cols()
        ))
        .bind(search)
        .bind(query.enabled)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<CategorySummary, ServiceError> {
        sqlx::query_as::<_, CategorySummary>(&format!(
            "SELECT {} FROM categories c WHERE c.id = $1",
            summary_cols()
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Category"))
    }

    pub async fn create(pool: &PgPool, input: &NewCategory) -> Result<CategorySummary, ServiceError> {
        let slug = Self::free_slug(pool, &input.name, None).await?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO categories (name, slug, description, image_url, sort_order, enabled)
             VALUES ($1, $2, NULLIF(BTRIM($3), ''), $4,
                     COALESCE($5, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM categories)),
                     $6)
             RETURNING id",
        )
        .bind(&input.name)
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.enabled)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, "A category with this slug already exists"))?;

        tracing::info!(category_id = %id, slug = %slug, "category created");
        Self::get(pool, id).await
    }

    /// Apply a partial update. Returns the updated category and the image URL
    /// it replaced, if any, so the caller can drop the old file.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &CategoryChanges,
    ) -> Result<(CategorySummary, Option<String>), ServiceError> {
        let current = Self::get(pool, id).await?.category;

        let slug = match &changes.name {
            Some(name) if *name != current.name => Some(Self::free_slug(pool, name, Some(id)).await?),
            _ => None,
        };

        sqlx::query(
            "UPDATE categories
             SET name = COALESCE($1, name),
                 slug = COALESCE($2, slug),
                 description = CASE WHEN $3::TEXT IS NULL THEN description ELSE NULLIF(BTRIM($3), '') END,
                 image_url = COALESCE($4, image_url),
                 sort_order = COALESCE($5, sort_order),
                 enabled = COALESCE($6, enabled),
                 updated_at = NOW()
             WHERE id = $7",
        )
        .bind(&changes.name)
        .bind(&slug)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(changes.sort_order)
        .bind(changes.enabled)
        .bind(id)
        .execute(pool)
        .await
        .map_err(|e| map_unique_violation(e, "A category with this slug already exists"))?;

        let replaced = match (&changes.image_url, current.image_url) {
            (Some(new), Some(old)) if *new != old => Some(old),
            _ => None,
        };
        Ok((Self::get(pool, id).await?, replaced))
    }

    /// Delete the category (sections and items cascade). Returns the deleted row.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Category, ServiceError> {
        let deleted = sqlx::query_as::<_, Category>(&format!(
            "DELETE FROM categories c WHERE c.id = $1 RETURNING {CATEGORY_COLS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Category"))?;
        tracing::info!(category_id = %id, "category deleted");
        Ok(deleted)
    }

    /// Persist the given order: each id gets its index as `sort_order`.
    pub async fn reorder(pool: &PgPool, ids: &[Uuid]) -> Result<(), ServiceError> {
        let mut tx = pool.begin().await?;
        for (idx, id) in ids.iter().enumerate() {
            let res = sqlx::query(
                "UPDATE categories SET sort_order = $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(idx as i32)
            .bind(id)
            .execute(&mut *tx)
            .await?;
            if res.rows_affected() == 0 {
                return Err(ServiceError::NotFound("Category"));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<Category>, ServiceError> {
        let rows = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLS} FROM categories c
             WHERE c.enabled = TRUE
             ORDER BY c.sort_order, c.name"
        ))
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_enabled_by_slug(pool: &PgPool, slug: &str) -> Result<Category, ServiceError> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLS} FROM categories c WHERE c.slug = $1 AND c.enabled = TRUE"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Category"))
    }

    async fn free_slug(pool: &PgPool, name: &str, exclude: Option<Uuid>) -> Result<String, ServiceError> {
        let base = slugify(name);
        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT slug FROM categories
             WHERE (slug = $1 OR slug LIKE $1 || '-%') AND ($2::UUID IS NULL OR id <> $2)",
        )
        .bind(&base)
        .bind(exclude)
        .fetch_all(pool)
        .await?;
        Ok(unique_slug(&base, &taken))
    }
}
