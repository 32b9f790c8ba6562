use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::temporary_price::TemporaryPrice;
use crate::error::ServiceError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub category_id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    pub image_url: Option<String>,
    pub available: bool,
    pub enabled: bool,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin representation: the item plus its price at the reference instant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    #[serde(flatten)]
    pub item: MenuItem,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    pub has_active_temporary_price: bool,
    pub active_temporary_price: Option<TemporaryPrice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Unavailable,
}

/// Filter on how an item is currently priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceStatus {
    /// No temporary rule in effect.
    Base,
    TemporaryActive,
    /// An enabled rule starts later.
    TemporaryScheduled,
}

impl PriceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceStatus::Base => "base",
            PriceStatus::TemporaryActive => "temporary-active",
            PriceStatus::TemporaryScheduled => "temporary-scheduled",
        }
    }
}

/// Query params for GET /admin/menu-items.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub availability: Option<Availability>,
    pub price_status: Option<PriceStatus>,
    pub include_disabled: Option<bool>,
    pub at: Option<DateTime<Utc>>,
}

/// Body for POST /admin/menu-items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuItemRequest {
    pub category_id: Uuid,
    pub section_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub enabled: Option<bool>,
}

/// Body for PATCH /admin/menu-items/{id}.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemRequest {
    pub category_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SetAvailabilityRequest {
    pub available: bool,
}

/// Apply a description patch: absent keeps `current`, blank clears it.
pub fn merge_description(patch: Option<&str>, current: Option<String>) -> Option<String> {
    match patch.map(str::trim) {
        None => current,
        Some("") => None,
        Some(d) => Some(d.to_string()),
    }
}

/// Field rules shared by create and update.
pub fn validate_fields(
    name: &str,
    description: Option<&str>,
    base_price: Decimal,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::validation("Item name is required"));
    }
    if name.chars().count() > 200 {
        return Err(ServiceError::validation("Item name must be at most 200 characters"));
    }
    if description.is_some_and(|d| d.chars().count() > 500) {
        return Err(ServiceError::validation("Description must be at most 500 characters"));
    }
    if base_price < Decimal::ZERO {
        return Err(ServiceError::validation("Price must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_description_clears() {
        let current = Some("Spicy chicken wings".to_string());
        assert_eq!(merge_description(None, current.clone()), current);
        assert_eq!(merge_description(Some("  "), current.clone()), None);
        assert_eq!(
            merge_description(Some(" With dip "), current),
            Some("With dip".to_string())
        );
    }

    #[test]
    fn field_rules() {
        assert!(validate_fields("Jollof Rice", Some("with chicken"), Decimal::from(4000)).is_ok());
        assert!(validate_fields(" ", None, Decimal::from(1)).is_err());
        assert!(validate_fields("x", Some(&"d".repeat(501)), Decimal::from(1)).is_err());
        assert!(validate_fields("x", None, Decimal::new(-1, 2)).is_err());
        assert!(validate_fields("x", None, Decimal::ZERO).is_ok());
    }

    #[test]
    fn query_enums_parse_from_wire_names() {
        let status: PriceStatus = serde_json::from_str("\"temporary-scheduled\"").unwrap();
        assert_eq!(status, PriceStatus::TemporaryScheduled);
        assert_eq!(status.as_str(), "temporary-scheduled");
        let avail: Availability = serde_json::from_str("\"unavailable\"").unwrap();
        assert_eq!(avail, Availability::Unavailable);
    }

    #[test]
    fn base_price_accepts_numbers_and_strings() {
        let body: CreateMenuItemRequest = serde_json::from_value(serde_json::json!({
            "categoryId": Uuid::nil(),
            "sectionId": Uuid::nil(),
            "name": "Heineken",
            "basePrice": 3000
        }))
        .unwrap();
        assert_eq!(body.base_price, Decimal::from(3000));

        let body: UpdateMenuItemRequest =
            serde_json::from_value(serde_json::json!({ "basePrice": "3200.50" })).unwrap();
        assert_eq!(body.base_price, Some(Decimal::new(320050, 2)));
    }
}
