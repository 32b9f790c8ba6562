use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Second level of the menu, e.g. "Signature Cocktails" under "Drinks".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub category_id: Uuid,
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

/// Query params for GET /admin/sections.
///
/// `enabled` filters on the flag; without it, disabled sections are hidden
/// unless `includeDisabled=true`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category_id: Option<Uuid>,
    pub search: Option<String>,
    pub enabled: Option<bool>,
    pub include_disabled: Option<bool>,
}

impl SectionQuery {
    /// Effective enabled filter: `None` means both.
    pub fn enabled_filter(&self) -> Option<bool> {
        match (self.enabled, self.include_disabled) {
            (Some(e), _) => Some(e),
            (None, Some(true)) => None,
            (None, _) => Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub category_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionChanges {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub sort_order: Option<i32>,
    pub image_url: Option<String>,
}

/// Body for POST /admin/sections/reorder.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderSectionsRequest {
    pub category_id: Uuid,
    pub section_ids: Vec<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_filter_defaults_to_enabled_only() {
        let q = SectionQuery::default();
        assert_eq!(q.enabled_filter(), Some(true));

        let q = SectionQuery { include_disabled: Some(true), ..Default::default() };
        assert_eq!(q.enabled_filter(), None);

        let q = SectionQuery {
            enabled: Some(false),
            include_disabled: Some(true),
            ..Default::default()
        };
        assert_eq!(q.enabled_filter(), Some(false));
    }
}
