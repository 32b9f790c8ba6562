use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{
        auth::AuthenticatedAdmin,
        temporary_price::{
            AtQuery, CreateTemporaryPriceRequest, SetEnabledRequest, TemporaryPrice,
            TemporaryPriceView, UpdateTemporaryPriceRequest,
        },
    },
    routes::{data, success, Data, Success},
    services::{
        menu_items::MenuItemService,
        metrics,
        pricing::{self, PriceSchedule},
        temporary_prices::TemporaryPriceService,
    },
    AppState,
};

const ENTITY: &str = "temporary_price";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleResponse<'a> {
    at: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::float")]
    base_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    effective_price: Decimal,
    #[serde(flatten)]
    schedule: PriceSchedule<'a>,
}

/// GET /admin/menu-items/{id}/temporary-prices
pub async fn list_temporary_prices(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(item_id): Path<Uuid>,
    Query(at): Query<AtQuery>,
) -> ApiResult<Json<Data<Vec<TemporaryPriceView>>>> {
    let at = at.instant();
    let rules = TemporaryPriceService::list(&state.db, item_id).await?;
    let views = rules
        .into_iter()
        .map(|rule| TemporaryPriceView {
            status: pricing::rule_status(&rule, at),
            rule,
        })
        .collect();
    Ok(data(views))
}

/// GET /admin/menu-items/{id}/temporary-prices/schedule
pub async fn price_schedule(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(item_id): Path<Uuid>,
    Query(at): Query<AtQuery>,
) -> ApiResult<Response> {
    let at = at.instant();
    let item = MenuItemService::get(&state.db, item_id).await?;
    let rules = TemporaryPriceService::list(&state.db, item_id).await?;

    let body = ScheduleResponse {
        at,
        base_price: item.base_price,
        effective_price: pricing::effective_price(item.base_price, &rules, item_id, at),
        schedule: pricing::schedule(&rules, item_id, at),
    };
    Ok(data(body).into_response())
}

pub async fn create_temporary_price(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(item_id): Path<Uuid>,
    Json(body): Json<CreateTemporaryPriceRequest>,
) -> ApiResult<(StatusCode, Json<Data<TemporaryPrice>>)> {
    let new = body.into_new(item_id)?;
    let rule = TemporaryPriceService::create(&state.db, &new).await?;
    metrics::record_change(ENTITY, "create");
    Ok((StatusCode::CREATED, data(rule)))
}

pub async fn update_temporary_price(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path((item_id, id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTemporaryPriceRequest>,
) -> ApiResult<Json<Data<TemporaryPrice>>> {
    let current = TemporaryPriceService::get(&state.db, item_id, id).await?;
    let merged = body.apply(&current)?;
    let rule = TemporaryPriceService::update(&state.db, id, &merged).await?;
    metrics::record_change(ENTITY, "update");
    Ok(data(rule))
}

pub async fn set_temporary_price_enabled(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path((item_id, id)): Path<(Uuid, Uuid)>,
    Json(body): Json<SetEnabledRequest>,
) -> ApiResult<Json<Data<TemporaryPrice>>> {
    let rule = TemporaryPriceService::set_enabled(&state.db, item_id, id, body.enabled).await?;
    metrics::record_change(ENTITY, if body.enabled { "enable" } else { "disable" });
    Ok(data(rule))
}

pub async fn duplicate_temporary_price(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path((item_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<Data<TemporaryPrice>>)> {
    let copy = TemporaryPriceService::duplicate(&state.db, item_id, id).await?;
    metrics::record_change(ENTITY, "duplicate");
    tracing::info!(source_id = %id, copy_id = %copy.id, "temporary price duplicated");
    Ok((StatusCode::CREATED, data(copy)))
}

pub async fn delete_temporary_price(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path((item_id, id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Data<Success>>> {
    TemporaryPriceService::delete(&state.db, item_id, id).await?;
    metrics::record_change(ENTITY, "delete");
    Ok(success())
}
