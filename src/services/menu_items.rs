use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    models::{
        menu_item::{
            merge_description, validate_fields, Availability, CreateMenuItemRequest, MenuItem, MenuItemQuery,
            MenuItemView, UpdateMenuItemRequest,
        },
        pagination::Page,
    },
    services::{pricing, slug::slugify_or_default, temporary_prices::TemporaryPriceService},
};

const ITEM_COLS: &str = "m.id, m.category_id, m.section_id, m.name, m.slug, m.description, m.base_price,
     m.image_url, m.available, m.enabled, m.sort_order, m.created_at, m.updated_at";

/// SQL mirror of `pricing::active_rule` qualification, used only for filtering.
const HAS_ACTIVE_RULE: &str = "EXISTS (SELECT 1 FROM temporary_prices tp
     WHERE tp.menu_item_id = m.id AND tp.enabled
       AND tp.start_at <= $7 AND tp.end_at >= $7)";

const HAS_SCHEDULED_RULE: &str = "EXISTS (SELECT 1 FROM temporary_prices tp
     WHERE tp.menu_item_id = m.id AND tp.enabled AND tp.start_at > $7)";

pub struct MenuItemService;

impl MenuItemService {
    pub async fn list(
        pool: &PgPool,
        query: &MenuItemQuery,
        page: Page,
        at: DateTime<Utc>,
    ) -> Result<(Vec<MenuItemView>, i64), ServiceError> {
        let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let available = query.availability.map(|a| a == Availability::Available);
        let include_disabled = query.include_disabled.unwrap_or(true);
        let price_status = query.price_status.map(|s| s.as_str());

        let filter = format!(
            "($1::UUID IS NULL OR m.category_id = $1)
             AND ($2::UUID IS NULL OR m.section_id = $2)
             AND ($3::TEXT IS NULL OR m.name ILIKE '%' || $3 || '%' OR m.description ILIKE '%' || $3 || '%')
             AND ($4::BOOLEAN IS NULL OR m.available = $4)
             AND ($5::BOOLEAN OR m.enabled)
             AND (CASE $6::TEXT
                    WHEN 'base' THEN NOT {HAS_ACTIVE_RULE}
                    WHEN 'temporary-active' THEN {HAS_ACTIVE_RULE}
                    WHEN 'temporary-scheduled' THEN {HAS_SCHEDULED_RULE}
                    ELSE TRUE
                  END)"
        );

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM menu_items m WHERE {filter}"
        ))
        .bind(query.category_id)
        .bind(query.section_id)
        .bind(search)
        .bind(available)
        .bind(include_disabled)
        .bind(price_status)
        .bind(at)
        .fetch_one(pool)
        .await?;

        let items = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLS} FROM menu_items m WHERE {filter}
             ORDER BY m.sort_order, m.name
             LIMIT $8 OFFSET $9"
        ))
        .bind(query.category_id)
        .bind(query.section_id)
        .bind(search)
        .bind(available)
        .bind(include_disabled)
        .bind(price_status)
        .bind(at)
        .bind(page.per_page)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok((Self::views(pool, items, at).await?, total))
    }

    pub async fn get(pool: &PgPool, id: Uuid) -> Result<MenuItem, ServiceError> {
        sqlx::query_as::<_, MenuItem>(&format!("SELECT {ITEM_COLS} FROM menu_items m WHERE m.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ServiceError::NotFound("Menu item"))
    }

    pub async fn get_view(pool: &PgPool, id: Uuid, at: DateTime<Utc>) -> Result<MenuItemView, ServiceError> {
        let item = Self::get(pool, id).await?;
        let mut views = Self::views(pool, vec![item], at).await?;
        views.pop().ok_or(ServiceError::NotFound("Menu item"))
    }

    pub async fn create(pool: &PgPool, req: &CreateMenuItemRequest) -> Result<MenuItem, ServiceError> {
        validate_fields(&req.name, req.description.as_deref(), req.base_price)?;
        ensure_section_in_category(pool, req.section_id, req.category_id).await?;

        let name = req.name.trim();
        let slug = slugify_or_default(req.slug.as_deref().unwrap_or(name));
        let description = merge_description(req.description.as_deref(), None);

        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "INSERT INTO menu_items AS m
                 (category_id, section_id, name, slug, description, base_price, image_url,
                  available, enabled, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9,
                     (SELECT COALESCE(MAX(sort_order) + 1, 0) FROM menu_items WHERE section_id = $2))
             RETURNING {ITEM_COLS}"
        ))
        .bind(req.category_id)
        .bind(req.section_id)
        .bind(name)
        .bind(&slug)
        .bind(&description)
        .bind(req.base_price)
        .bind(&req.image_url)
        .bind(req.available.unwrap_or(true))
        .bind(req.enabled.unwrap_or(true))
        .fetch_one(pool)
        .await?;

        tracing::info!(menu_item_id = %item.id, slug = %item.slug, "menu item created");
        Ok(item)
    }

    /// Partial update; the merged item is validated as a whole.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        req: &UpdateMenuItemRequest,
    ) -> Result<MenuItem, ServiceError> {
        let current = Self::get(pool, id).await?;

        let name = req.name.as_deref().map(str::trim).unwrap_or(&current.name).to_string();
        let description = merge_description(req.description.as_deref(), current.description);
        let base_price = req.base_price.unwrap_or(current.base_price);
        validate_fields(&name, description.as_deref(), base_price)?;

        let category_id = req.category_id.unwrap_or(current.category_id);
        let section_id = req.section_id.unwrap_or(current.section_id);
        if category_id != current.category_id || section_id != current.section_id {
            ensure_section_in_category(pool, section_id, category_id).await?;
        }

        let slug = match (&req.slug, &req.name) {
            (Some(s), _) => slugify_or_default(s),
            (None, Some(_)) if name != current.name => slugify_or_default(&name),
            _ => current.slug,
        };

        let item = sqlx::query_as::<_, MenuItem>(&format!(
            "UPDATE menu_items AS m
             SET category_id = $1, section_id = $2, name = $3, slug = $4, description = $5,
                 base_price = $6, image_url = $7, available = $8, enabled = $9,
                 updated_at = NOW()
             WHERE m.id = $10
             RETURNING {ITEM_COLS}"
        ))
        .bind(category_id)
        .bind(section_id)
        .bind(&name)
        .bind(&slug)
        .bind(&description)
        .bind(base_price)
        .bind(req.image_url.clone().or(current.image_url))
        .bind(req.available.unwrap_or(current.available))
        .bind(req.enabled.unwrap_or(current.enabled))
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(item)
    }

    pub async fn set_available(pool: &PgPool, id: Uuid, available: bool) -> Result<MenuItem, ServiceError> {
        Self::set_flag(pool, id, "available", available).await
    }

    pub async fn set_enabled(pool: &PgPool, id: Uuid, enabled: bool) -> Result<MenuItem, ServiceError> {
        Self::set_flag(pool, id, "enabled", enabled).await
    }

    async fn set_flag(pool: &PgPool, id: Uuid, column: &'static str, value: bool) -> Result<MenuItem, ServiceError> {
        sqlx::query_as::<_, MenuItem>(&format!(
            "UPDATE menu_items AS m SET {column} = $1, updated_at = NOW()
             WHERE m.id = $2 RETURNING {ITEM_COLS}"
        ))
        .bind(value)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Menu item"))
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<MenuItem, ServiceError> {
        let deleted = sqlx::query_as::<_, MenuItem>(&format!(
            "DELETE FROM menu_items AS m WHERE m.id = $1 RETURNING {ITEM_COLS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Menu item"))?;
        tracing::info!(menu_item_id = %id, "menu item deleted");
        Ok(deleted)
    }

    /// Enabled items of the given sections, in display order.
    pub async fn list_enabled_for_sections(
        pool: &PgPool,
        section_ids: &[Uuid],
    ) -> Result<Vec<MenuItem>, ServiceError> {
        let rows = sqlx::query_as::<_, MenuItem>(&format!(
            "SELECT {ITEM_COLS} FROM menu_items m
             WHERE m.section_id = ANY($1) AND m.enabled = TRUE
             ORDER BY m.sort_order, m.name"
        ))
        .bind(section_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }

    /// Attach the current price to each item, loading all their rules in one query.
    pub async fn views(
        pool: &PgPool,
        items: Vec<MenuItem>,
        at: DateTime<Utc>,
    ) -> Result<Vec<MenuItemView>, ServiceError> {
        let ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();
        let rules = TemporaryPriceService::for_items(pool, &ids).await?;
        Ok(items
            .into_iter()
            .map(|item| price_view(item, &rules, at))
            .collect())
    }
}

pub fn price_view(
    item: MenuItem,
    rules: &[crate::models::temporary_price::TemporaryPrice],
    at: DateTime<Utc>,
) -> MenuItemView {
    let active = pricing::active_rule(rules, item.id, at).cloned();
    MenuItemView {
        current_price: active.as_ref().map(|r| r.price).unwrap_or(item.base_price),
        has_active_temporary_price: active.is_some(),
        active_temporary_price: active,
        item,
    }
}

async fn ensure_section_in_category(
    pool: &PgPool,
    section_id: Uuid,
    category_id: Uuid,
) -> Result<(), ServiceError> {
    let ok: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sections WHERE id = $1 AND category_id = $2)",
    )
    .bind(section_id)
    .bind(category_id)
    .fetch_one(pool)
    .await?;
    if !ok {
        return Err(ServiceError::validation("Section does not belong to the selected category"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::temporary_price::TemporaryPrice;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn item(id: Uuid) -> MenuItem {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        MenuItem {
            id,
            category_id: Uuid::new_v4(),
            section_id: Uuid::new_v4(),
            name: "Grilled Chicken".into(),
            slug: "grilled-chicken".into(),
            description: None,
            base_price: Decimal::from(5000),
            image_url: None,
            available: true,
            enabled: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn price_view_uses_active_rule() {
        let id = Uuid::new_v4();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap();
        let rules = vec![TemporaryPrice {
            id: Uuid::new_v4(),
            menu_item_id: id,
            rule_name: "Live Band Night".into(),
            price: Decimal::from(6500),
            start_at: Utc.with_ymd_and_hms(2024, 6, 1, 20, 0, 0).unwrap(),
            end_at: Utc.with_ymd_and_hms(2024, 6, 1, 23, 0, 0).unwrap(),
            enabled: true,
            created_at: at,
            updated_at: at,
        }];

        let view = price_view(item(id), &rules, at);
        assert!(view.has_active_temporary_price);
        assert_eq!(view.current_price, Decimal::from(6500));

        let later = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
        let view = price_view(item(id), &rules, later);
        assert!(!view.has_active_temporary_price);
        assert!(view.active_temporary_price.is_none());
        assert_eq!(view.current_price, Decimal::from(5000));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["currentPrice"], 5000.0);
        assert_eq!(json["basePrice"], 5000.0);
        assert_eq!(json["hasActiveTemporaryPrice"], false);
    }
}
