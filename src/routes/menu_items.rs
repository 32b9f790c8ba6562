use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{
        auth::AuthenticatedAdmin,
        menu_item::{
            CreateMenuItemRequest, MenuItemQuery, MenuItemView, SetAvailabilityRequest,
            UpdateMenuItemRequest,
        },
        pagination::{Page, PaginationMeta},
        temporary_price::{AtQuery, SetEnabledRequest},
    },
    routes::{data, success, Data, Success},
    services::{menu_items::MenuItemService, metrics},
    AppState,
};

/// Menu item lists nest their pagination inside `data`.
#[derive(Debug, Serialize)]
pub struct MenuItemPage {
    pub items: Vec<MenuItemView>,
    pub meta: PaginationMeta,
}

pub async fn list_menu_items(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<MenuItemQuery>,
) -> ApiResult<Json<Data<MenuItemPage>>> {
    let at = query.at.unwrap_or_else(Utc::now);
    let page = Page::new(query.page, query.page_size);
    let (items, total) = MenuItemService::list(&state.db, &query, page, at).await?;
    Ok(data(MenuItemPage {
        items,
        meta: PaginationMeta::new(total, page, "/admin/menu-items"),
    }))
}

pub async fn get_menu_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Query(at): Query<AtQuery>,
) -> ApiResult<Json<Data<MenuItemView>>> {
    Ok(data(MenuItemService::get_view(&state.db, id, at.instant()).await?))
}

pub async fn create_menu_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<CreateMenuItemRequest>,
) -> ApiResult<(StatusCode, Json<Data<MenuItemView>>)> {
    let item = MenuItemService::create(&state.db, &body).await?;
    metrics::record_change("menu_item", "create");
    let view = MenuItemService::get_view(&state.db, item.id, Utc::now()).await?;
    Ok((StatusCode::CREATED, data(view)))
}

pub async fn update_menu_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMenuItemRequest>,
) -> ApiResult<Json<Data<MenuItemView>>> {
    let before = MenuItemService::get(&state.db, id).await?;
    let item = MenuItemService::update(&state.db, id, &body).await?;
    if let Some(old) = before.image_url.filter(|old| item.image_url.as_ref() != Some(old)) {
        state.images.delete_url(&old).await;
    }
    metrics::record_change("menu_item", "update");
    Ok(data(MenuItemService::get_view(&state.db, id, Utc::now()).await?))
}

/// PATCH /admin/menu-items/{id}/availability
pub async fn set_menu_item_availability(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SetAvailabilityRequest>,
) -> ApiResult<Json<Data<MenuItemView>>> {
    MenuItemService::set_available(&state.db, id, body.available).await?;
    metrics::record_change("menu_item", if body.available { "available" } else { "unavailable" });
    Ok(data(MenuItemService::get_view(&state.db, id, Utc::now()).await?))
}

/// PATCH /admin/menu-items/{id}/enabled
pub async fn set_menu_item_enabled(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SetEnabledRequest>,
) -> ApiResult<Json<Data<MenuItemView>>> {
    MenuItemService::set_enabled(&state.db, id, body.enabled).await?;
    metrics::record_change("menu_item", if body.enabled { "enable" } else { "disable" });
    Ok(data(MenuItemService::get_view(&state.db, id, Utc::now()).await?))
}

pub async fn delete_menu_item(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Data<Success>>> {
    let deleted = MenuItemService::delete(&state.db, id).await?;
    if let Some(url) = deleted.image_url {
        state.images.delete_url(&url).await;
    }
    metrics::record_change("menu_item", "delete");
    Ok(success())
}
