use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::{map_unique_violation, ServiceError},
    models::{
        pagination::Page,
        section::{NewSection, Section, SectionChanges, SectionQuery},
    },
    services::slug::{slugify, unique_slug},
};

const SECTION_COLS: &str = "id, category_id, name, slug, description, image_url, sort_order, enabled, created_at, updated_at";

pub struct SectionService;

impl SectionService {
    pub async fn list(
        pool: &PgPool,
        query: &SectionQuery,
        page: Page,
    ) -> Result<(Vec<Section>, i64), ServiceError> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let enabled = query.enabled_filter();
        let filter = "($1::UUID IS NULL OR category_id = $1)
                      AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')
                      AND ($3::BOOLEAN IS NULL OR enabled = $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM sections WHERE {filter}"))
            .bind(query.category_id)
            .bind(search)
            .bind(enabled)
            .fetch_one(pool)
            .await?;

        let rows = sqlx::query_as::<_, Section>(&format!(
            "SELECT {SECTION_COLS} FROM sections WHERE {filter}
             ORDER BY sort_order, name
             LIMIT $4 OFFSET $5"
        ))
        .bind(query.category_id)
        .bind(search)
        .bind(enabled)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<Section, ServiceError> {
        sqlx::query_as::<_, Section>(&format!("SELECT {SECTION_COLS} FROM sections WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ServiceError::NotFound("Section"))
    }

    pub async fn create(pool: &PgPool, input: &NewSection) -> Result<Section, ServiceError> {
        ensure_category(pool, input.category_id).await?;
        let slug = Self::free_slug(pool, input.category_id, &input.name, None).await?;

        let section = sqlx::query_as::<_, Section>(&format!(
            "INSERT INTO sections (category_id, name, slug, description, image_url, sort_order, enabled)
             VALUES ($1, $2, $3, NULLIF(BTRIM($4), ''), $5,
                     COALESCE($6, (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM sections WHERE category_id = $1)),
                     $7)
             RETURNING {SECTION_COLS}"
        ))
        .bind(input.category_id)
        .bind(&input.name)
        .bind(&slug)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.sort_order)
        .bind(input.enabled)
        .fetch_one(pool)
        .await
        .map_err(|e| map_unique_violation(e, "A section with this slug already exists"))?;

        tracing::info!(section_id = %section.id, slug = %section.slug, "section created");
        Ok(section)
    }

    /// Partial update. Moving a section to another category moves its items too.
    /// Returns the replaced image URL, if any.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        changes: &SectionChanges,
    ) -> Result<(Section, Option<String>), ServiceError> {
        let current = Self::get(pool, id).await?;
        let category_id = changes.category_id.unwrap_or(current.category_id);
        if category_id != current.category_id {
            ensure_category(pool, category_id).await?;
        }

        let renamed = changes.name.as_ref().is_some_and(|n| *n != current.name);
        let slug = if renamed || category_id != current.category_id {
            let name = changes.name.as_deref().unwrap_or(&current.name);
            Some(Self::free_slug(pool, category_id, name, Some(id)).await?)
        } else {
            None
        };

        let mut tx = pool.begin().await?;
        let section = sqlx::query_as::<_, Section>(&format!(
            "UPDATE sections
             SET category_id = $1,
                 name = COALESCE($2, name),
                 slug = COALESCE($3, slug),
                 description = CASE WHEN $4::TEXT IS NULL THEN description ELSE NULLIF(BTRIM($4), '') END,
                 image_url = COALESCE($5, image_url),
                 sort_order = COALESCE($6, sort_order),
                 enabled = COALESCE($7, enabled),
                 updated_at = NOW()
             WHERE id = $8
             RETURNING {SECTION_COLS}"
        ))
        .bind(category_id)
        .bind(&changes.name)
        .bind(&slug)
        .bind(&changes.description)
        .bind(&changes.image_url)
        .bind(changes.sort_order)
        .bind(changes.enabled)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, "A section with this slug already exists"))?;

        if category_id != current.category_id {
            sqlx::query("UPDATE menu_items SET category_id = $1, updated_at = NOW() WHERE section_id = $2")
                .bind(category_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        let replaced = match (&changes.image_url, current.image_url) {
            (Some(new), Some(old)) if *new != old => Some(old),
            _ => None,
        };
        Ok((section, replaced))
    }

    pub async fn set_enabled(pool: &PgPool, id: Uuid, enabled: bool) -> Result<Section, ServiceError> {
        sqlx::query_as::<_, Section>(&format!(
            "UPDATE sections SET enabled = $1, updated_at = NOW() WHERE id = $2 RETURNING {SECTION_COLS}"
        ))
        .bind(enabled)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Section"))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<Section, ServiceError> {
        let deleted = sqlx::query_as::<_, Section>(&format!(
            "DELETE FROM sections WHERE id = $1 RETURNING {SECTION_COLS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Section"))?;
        tracing::info!(section_id = %id, "section deleted");
        Ok(deleted)
    }

    /// Persist the order of sections inside one category.
    pub async fn reorder(pool: &PgPool, category_id: Uuid, ids: &[Uuid]) -> Result<(), ServiceError> {
        let mut tx = pool.begin().await?;
        for (idx, id) in ids.iter().enumerate() {
            let res = sqlx::query(
                "UPDATE sections SET sort_order = $1, updated_at = NOW()
                 WHERE id = $2 AND category_id = $3",
            )
            .bind(idx as i32)
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
            if res.rows_affected() == 0 {
                return Err(ServiceError::validation(format!(
                    "Section {id} does not belong to category {category_id}"
                )));
            }
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn list_enabled_for_category(
        pool: &PgPool,
        category_id: Uuid,
    ) -> Result<Vec<Section>, ServiceError> {
        let rows = sqlx::query_as::<_, Section>(&format!(
            "SELECT {SECTION_COLS} FROM sections
             WHERE category_id = $1 AND enabled = TRUE
             ORDER BY sort_order, name"
        ))
        .bind(category_id)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    async fn free_slug(
        pool: &PgPool,
        category_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, ServiceError> {
        let base = slugify(name);
        let taken: Vec<String> = sqlx::query_scalar(
            "SELECT slug FROM sections
             WHERE category_id = $1 AND (slug = $2 OR slug LIKE $2 || '-%')
               AND ($3::UUID IS NULL OR id <> $3)",
        )
        .bind(category_id)
        .bind(&base)
        .bind(exclude)
        .fetch_all(pool)
        .await?;
        Ok(unique_slug(&base, &taken))
    }
}

async fn ensure_category(pool: &PgPool, category_id: Uuid) -> Result<(), ServiceError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
        .bind(category_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(ServiceError::validation("Category does not exist"));
    }
    Ok(())
}
