pub mod auth;
pub mod categories;
pub mod forms;
pub mod health;
pub mod media;
pub mod menu_items;
pub mod metrics;
pub mod public;
pub mod sections;
pub mod temporary_prices;

use serde::Serialize;

use crate::models::pagination::PaginationMeta;

/// `{ "data": ... }` envelope used by every JSON response.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

pub fn data<T>(data: T) -> axum::Json<Data<T>> {
    axum::Json(Data { data })
}

/// `{ "data": [...], "meta": {...} }`, the shape of paginated admin lists.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

pub fn success() -> axum::Json<Data<Success>> {
    data(Success { success: true })
}
