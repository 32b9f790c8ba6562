use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::ApiResult,
    models::{
        public::{PublicCategory, PublicCategoryWithSections, SitemapEntry},
        temporary_price::AtQuery,
    },
    routes::{data, Data},
    services::public_menu::PublicMenuService,
    AppState,
};

/// GET /public/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> ApiResult<Json<Data<Vec<PublicCategory>>>> {
    Ok(data(PublicMenuService::categories(&state.db).await?))
}

/// GET /public/categories/{slug}
pub async fn category_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(at): Query<AtQuery>,
) -> ApiResult<Json<Data<PublicCategoryWithSections>>> {
    let category = PublicMenuService::category_by_slug(&state.db, &slug, at.instant()).await?;
    Ok(data(category))
}

/// GET /public/sitemap
pub async fn sitemap(State(state): State<AppState>) -> ApiResult<Json<Data<Vec<SitemapEntry>>>> {
    let entries = PublicMenuService::sitemap(&state.db, &state.config.public_base_url).await?;
    Ok(data(entries))
}
