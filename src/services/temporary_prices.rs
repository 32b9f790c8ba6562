use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    models::temporary_price::{NewTemporaryPrice, TemporaryPrice},
};

const RULE_COLS: &str =
    "id, menu_item_id, rule_name, price, start_at, end_at, enabled, created_at, updated_at";

/// Persistence for temporary price rules. Resolution lives in `services::pricing`.
pub struct TemporaryPriceService;

impl TemporaryPriceService {
    /// All rules of one item, earliest start first.
    pub async fn list(pool: &PgPool, menu_item_id: Uuid) -> Result<Vec<TemporaryPrice>, ServiceError> {
        ensure_item(pool, menu_item_id).await?;
        let rules = sqlx::query_as::<_, TemporaryPrice>(&format!(
            "SELECT {RULE_COLS} FROM temporary_prices
             WHERE menu_item_id = $1
             ORDER BY start_at, created_at"
        ))
        .bind(menu_item_id)
        .fetch_all(pool)
        .await?;
        Ok(rules)
    }

    /// Rules of several items at once, for pricing lists of items.
    pub async fn for_items(pool: &PgPool, item_ids: &[Uuid]) -> Result<Vec<TemporaryPrice>, ServiceError> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rules = sqlx::query_as::<_, TemporaryPrice>(&format!(
            "SELECT {RULE_COLS} FROM temporary_prices
             WHERE menu_item_id = ANY($1)
             ORDER BY start_at, created_at"
        ))
        .bind(item_ids)
        .fetch_all(pool)
        .await?;
        Ok(rules)
    }

    /// A rule, checked to belong to `menu_item_id`.
    pub async fn get(pool: &PgPool, menu_item_id: Uuid, id: Uuid) -> Result<TemporaryPrice, ServiceError> {
        sqlx::query_as::<_, TemporaryPrice>(&format!(
            "SELECT {RULE_COLS} FROM temporary_prices WHERE id = $1 AND menu_item_id = $2"
        ))
        .bind(id)
        .bind(menu_item_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Temporary price"))
    }

    pub async fn create(pool: &PgPool, rule: &NewTemporaryPrice) -> Result<TemporaryPrice, ServiceError> {
        ensure_item(pool, rule.menu_item_id).await?;
        let created = sqlx::query_as::<_, TemporaryPrice>(&format!(
            "INSERT INTO temporary_prices (menu_item_id, rule_name, price, start_at, end_at, enabled)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RULE_COLS}"
        ))
        .bind(rule.menu_item_id)
        .bind(&rule.rule_name)
        .bind(rule.price)
        .bind(rule.start_at)
        .bind(rule.end_at)
        .bind(rule.enabled)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            temporary_price_id = %created.id,
            menu_item_id = %created.menu_item_id,
            enabled = created.enabled,
            "temporary price created"
        );
        Ok(created)
    }

    /// Overwrite the editable fields of an existing rule.
    pub async fn update(pool: &PgPool, id: Uuid, rule: &NewTemporaryPrice) -> Result<TemporaryPrice, ServiceError> {
        sqlx::query_as::<_, TemporaryPrice>(&format!(
            "UPDATE temporary_prices
             SET rule_name = $1, price = $2, start_at = $3, end_at = $4, enabled = $5,
                 updated_at = NOW()
             WHERE id = $6 AND menu_item_id = $7
             RETURNING {RULE_COLS}"
        ))
        .bind(&rule.rule_name)
        .bind(rule.price)
        .bind(rule.start_at)
        .bind(rule.end_at)
        .bind(rule.enabled)
        .bind(id)
        .bind(rule.menu_item_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Temporary price"))
    }

    pub async fn set_enabled(
        pool: &PgPool,
        menu_item_id: Uuid,
        id: Uuid,
        enabled: bool,
    ) -> Result<TemporaryPrice, ServiceError> {
        sqlx::query_as::<_, TemporaryPrice>(&format!(
            "UPDATE temporary_prices SET enabled = $1, updated_at = NOW()
             WHERE id = $2 AND menu_item_id = $3
             RETURNING {RULE_COLS}"
        ))
        .bind(enabled)
        .bind(id)
        .bind(menu_item_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Temporary price"))
    }

    /// Insert a disabled copy of the rule.
    pub async fn duplicate(pool: &PgPool, menu_item_id: Uuid, id: Uuid) -> Result<TemporaryPrice, ServiceError> {
        let source = Self::get(pool, menu_item_id, id).await?;
        Self::create(pool, &source.duplicate()).await
    }

    pub async fn delete(pool: &PgPool, menu_item_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let res = sqlx::query("DELETE FROM temporary_prices WHERE id = $1 AND menu_item_id = $2")
            .bind(id)
            .bind(menu_item_id)
            .execute(pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(ServiceError::NotFound("Temporary price"));
        }
        tracing::info!(temporary_price_id = %id, "temporary price deleted");
        Ok(())
    }
}

async fn ensure_item(pool: &PgPool, menu_item_id: Uuid) -> Result<(), ServiceError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM menu_items WHERE id = $1)")
        .bind(menu_item_id)
        .fetch_one(pool)
        .await?;
    if !exists {
        return Err(ServiceError::NotFound("Menu item"));
    }
    Ok(())
}
