use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ServiceError;

/// A scheduled override of a menu item's price, active inside `[start_at, end_at]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryPrice {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub rule_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemporaryPrice {
    /// Copy of this rule, ready to insert. The copy starts disabled so the
    /// admin has to adjust its dates and re-enable it explicitly.
    pub fn duplicate(&self) -> NewTemporaryPrice {
        NewTemporaryPrice {
            menu_item_id: self.menu_item_id,
            rule_name: copy_name(&self.rule_name),
            price: self.price,
            start_at: self.start_at,
            end_at: self.end_at,
            enabled: false,
        }
    }
}

/// Window position of a rule relative to an instant. `enabled` is not considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TemporaryPriceStatus {
    Active,
    Upcoming,
    Expired,
}

/// Rule plus its computed status, as returned by the admin API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporaryPriceView {
    #[serde(flatten)]
    pub rule: TemporaryPrice,
    pub status: TemporaryPriceStatus,
}

/// Fields of a rule about to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTemporaryPrice {
    pub menu_item_id: Uuid,
    pub rule_name: String,
    pub price: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub enabled: bool,
}

/// Body for POST /admin/menu-items/{id}/temporary-prices.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemporaryPriceRequest {
    pub rule_name: String,
    pub price: Decimal,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub enabled: Option<bool>,
}

impl CreateTemporaryPriceRequest {
    pub fn into_new(self, menu_item_id: Uuid) -> Result<NewTemporaryPrice, ServiceError> {
        let rule_name = self.rule_name.trim().to_string();
        validate_rule(&rule_name, self.price, self.start_at, self.end_at)?;
        Ok(NewTemporaryPrice {
            menu_item_id,
            rule_name,
            price: self.price,
            start_at: self.start_at,
            end_at: self.end_at,
            enabled: self.enabled.unwrap_or(true),
        })
    }
}

/// Body for PATCH /admin/menu-items/{id}/temporary-prices/{tp_id}.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemporaryPriceRequest {
    pub rule_name: Option<String>,
    pub price: Option<Decimal>,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub enabled: Option<bool>,
}

impl UpdateTemporaryPriceRequest {
    /// Merge the patch into `current` and validate the result as a whole,
    /// so a new `end_at` is checked against the stored `start_at`.
    pub fn apply(self, current: &TemporaryPrice) -> Result<NewTemporaryPrice, ServiceError> {
        let merged = NewTemporaryPrice {
            menu_item_id: current.menu_item_id,
            rule_name: self
                .rule_name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| current.rule_name.clone()),
            price: self.price.unwrap_or(current.price),
            start_at: self.start_at.unwrap_or(current.start_at),
            end_at: self.end_at.unwrap_or(current.end_at),
            enabled: self.enabled.unwrap_or(current.enabled),
        };
        validate_rule(&merged.rule_name, merged.price, merged.start_at, merged.end_at)?;
        Ok(merged)
    }
}

#[derive(Debug, Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Optional `?at=` override of the reference instant (defaults to now).
#[derive(Debug, Default, Deserialize)]
pub struct AtQuery {
    pub at: Option<DateTime<Utc>>,
}

impl AtQuery {
    pub fn instant(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }
}

pub const MAX_RULE_NAME_CHARS: usize = 100;

const COPY_SUFFIX: &str = " (Copy)";

/// `"{name} (Copy)"`, with `name` cut on a char boundary so the result stays
/// within `MAX_RULE_NAME_CHARS`.
fn copy_name(name: &str) -> String {
    let keep = MAX_RULE_NAME_CHARS - COPY_SUFFIX.chars().count();
    let base: String = name.chars().take(keep).collect();
    format!("{}{COPY_SUFFIX}", base.trim_end())
}

fn validate_rule(
    rule_name: &str,
    price: Decimal,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
) -> Result<(), ServiceError> {
    if rule_name.is_empty() {
        return Err(ServiceError::validation("Rule name is required"));
    }
    if rule_name.chars().count() > MAX_RULE_NAME_CHARS {
        return Err(ServiceError::validation("Rule name must be at most 100 characters"));
    }
    if price < Decimal::ZERO {
        return Err(ServiceError::validation("Price must be positive"));
    }
    if end_at <= start_at {
        return Err(ServiceError::validation("End date must be after start date"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::prelude::FromPrimitive;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, h, 0, 0).unwrap()
    }

    fn rule() -> TemporaryPrice {
        TemporaryPrice {
            id: Uuid::new_v4(),
            menu_item_id: Uuid::new_v4(),
            rule_name: "Live Band Night".into(),
            price: Decimal::from(6500),
            start_at: at(20),
            end_at: at(23),
            enabled: true,
            created_at: at(1),
            updated_at: at(1),
        }
    }

    #[test]
    fn duplicate_is_disabled_copy() {
        let source = rule();
        let copy = source.duplicate();
        assert!(!copy.enabled);
        assert_eq!(copy.rule_name, "Live Band Night (Copy)");
        assert_eq!(copy.menu_item_id, source.menu_item_id);
        assert_eq!(copy.price, source.price);
        assert_eq!(copy.start_at, source.start_at);
        assert_eq!(copy.end_at, source.end_at);
    }

    #[test]
    fn duplicate_of_long_name_stays_valid() {
        let mut source = rule();
        source.rule_name = "é".repeat(MAX_RULE_NAME_CHARS);
        let copy = source.duplicate();
        assert_eq!(copy.rule_name.chars().count(), MAX_RULE_NAME_CHARS);
        assert!(copy.rule_name.ends_with(" (Copy)"));
        assert!(validate_rule(&copy.rule_name, copy.price, copy.start_at, copy.end_at).is_ok());

        source.rule_name = "x".repeat(93);
        assert_eq!(source.duplicate().rule_name, format!("{} (Copy)", "x".repeat(93)));
    }

    #[test]
    fn create_request_defaults_to_enabled() {
        let req = CreateTemporaryPriceRequest {
            rule_name: "  Happy Hour ".into(),
            price: Decimal::from(3000),
            start_at: at(17),
            end_at: at(19),
            enabled: None,
        };
        let item = Uuid::new_v4();
        let new = req.into_new(item).unwrap();
        assert!(new.enabled);
        assert_eq!(new.rule_name, "Happy Hour");
        assert_eq!(new.menu_item_id, item);
    }

    #[test]
    fn create_request_rejects_bad_input() {
        let base = || CreateTemporaryPriceRequest {
            rule_name: "Promo".into(),
            price: Decimal::from(10),
            start_at: at(10),
            end_at: at(12),
            enabled: Some(true),
        };

        let mut req = base();
        req.rule_name = "   ".into();
        assert!(matches!(req.into_new(Uuid::nil()), Err(ServiceError::Validation(_))));

        let mut req = base();
        req.price = Decimal::from_f64(-1.5).unwrap();
        assert!(matches!(req.into_new(Uuid::nil()), Err(ServiceError::Validation(_))));

        let mut req = base();
        req.end_at = at(10);
        assert!(matches!(req.into_new(Uuid::nil()), Err(ServiceError::Validation(_))));

        let mut req = base();
        req.price = Decimal::ZERO;
        assert!(req.into_new(Uuid::nil()).is_ok());
    }

    #[test]
    fn update_validates_against_stored_window() {
        let current = rule();
        let patch = UpdateTemporaryPriceRequest {
            end_at: Some(at(19)),
            ..Default::default()
        };
        assert!(patch.apply(&current).is_err());

        let patch = UpdateTemporaryPriceRequest {
            price: Some(Decimal::from(7000)),
            enabled: Some(false),
            ..Default::default()
        };
        let merged = patch.apply(&current).unwrap();
        assert_eq!(merged.price, Decimal::from(7000));
        assert!(!merged.enabled);
        assert_eq!(merged.rule_name, current.rule_name);
    }

    #[test]
    fn view_serializes_camel_case_with_status() {
        let view = TemporaryPriceView {
            rule: rule(),
            status: TemporaryPriceStatus::Upcoming,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["status"], "UPCOMING");
        assert_eq!(json["ruleName"], "Live Band Night");
        assert_eq!(json["price"], 6500.0);
        assert!(json.get("menuItemId").is_some());
    }
}
