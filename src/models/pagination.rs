use serde::Serialize;

pub const DEFAULT_PER_PAGE: i64 = 10;
pub const MAX_PER_PAGE: i64 = 100;

/// Page number and size after clamping user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub per_page: i64,
}

impl Page {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }
}

/// Pagination block returned next to every admin list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
    pub first_page: i64,
    pub first_page_url: String,
    pub last_page_url: String,
    pub next_page_url: Option<String>,
    pub previous_page_url: Option<String>,
}

impl PaginationMeta {
    /// `path` is the list endpoint, e.g. `/admin/categories`. Page URLs carry
    /// only `page` and `perPage`; filters are left to the caller.
    pub fn new(total: i64, page: Page, path: &str) -> Self {
        let last_page = ((total + page.per_page - 1) / page.per_page).max(1);
        let url = |p: i64| format!("{path}?page={p}&perPage={}", page.per_page);

        Self {
            total,
            per_page: page.per_page,
            current_page: page.page,
            last_page,
            first_page: 1,
            first_page_url: url(1),
            last_page_url: url(last_page),
            next_page_url: (page.page < last_page).then(|| url(page.page + 1)),
            previous_page_url: (page.page > 1).then(|| url(page.page - 1)),
        }
    }
}
