use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ServiceError;

/// Top level of the menu ("Food", "Drinks", "Smoke").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin list/detail row: the category plus a summary of its sections.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub category: Category,
    pub sections_count: i64,
    pub section_names: Vec<String>,
}

/// Query params for GET /admin/categories.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub enabled: Option<bool>,
}

/// Validated create input. `image_url` is filled in after the upload is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

/// Body for POST /admin/categories/reorder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderCategoriesRequest {
    pub category_ids: Vec<Uuid>,
}

/// Shared name rule for categories and sections.
pub fn validate_name(name: &str, what: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::validation(format!("{what} name is required")));
    }
    if name.chars().count() > 100 {
        return Err(ServiceError::validation(format!(
            "{what} name must be at most 100 characters"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed_and_bounded() {
        assert_eq!(validate_name("  Drinks ", "Category").unwrap(), "Drinks");
        assert!(validate_name("   ", "Category").is_err());
        assert!(validate_name(&"x".repeat(101), "Section").is_err());
        assert!(validate_name(&"x".repeat(100), "Section").is_ok());
    }

    #[test]
    fn order_is_renamed_on_the_wire() {
        let now = Utc::now();
        let summary = CategorySummary {
            category: Category {
                id: Uuid::nil(),
                name: "Food".into(),
                slug: "food".into(),
                description: None,
                image_url: None,
                sort_order: 2,
                enabled: true,
                created_at: now,
                updated_at: now,
            },
            sections_count: 1,
            section_names: vec!["Sides".into()],
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["order"], 2);
        assert_eq!(json["sectionsCount"], 1);
        assert_eq!(json["sectionNames"][0], "Sides");
        assert!(json.get("sortOrder").is_none());
    }
}
