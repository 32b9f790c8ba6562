use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::{ApiResult, ServiceError},
    models::{
        auth::AuthenticatedAdmin,
        category::{
            validate_name, CategoryChanges, CategoryQuery, CategorySummary, NewCategory,
            ReorderCategoriesRequest,
        },
        pagination::{Page, PaginationMeta},
    },
    routes::{data, forms::MenuForm, success, Data, Paginated, Success},
    services::{categories::CategoryService, images::ImageKind, metrics},
    AppState,
};

/// GET /admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Json<Paginated<CategorySummary>>> {
    let page = Page::new(query.page, query.per_page);
    let (rows, total) = CategoryService::list(&state.db, &query, page).await?;
    Ok(Json(Paginated {
        data: rows,
        meta: PaginationMeta::new(total, page, "/admin/categories"),
    }))
}

/// GET /admin/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Data<CategorySummary>>> {
    Ok(data(CategoryService::get(&state.db, id).await?))
}

/// POST /admin/categories (multipart)
pub async fn create_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Data<CategorySummary>>)> {
    let form = MenuForm::parse(multipart).await?;
    let name = validate_name(form.name.as_deref().unwrap_or(""), "Category")?;

    let image_url = match &form.image {
        Some(img) => {
            let url = state.images.save(ImageKind::Category, img).await?;
            metrics::record_upload(ImageKind::Category.label());
            Some(url)
        }
        None => None,
    };

    let input = NewCategory {
        name,
        description: form.description,
        enabled: form.enabled.unwrap_or(true),
        sort_order: form.order,
        image_url: image_url.clone(),
    };

    match CategoryService::create(&state.db, &input).await {
        Ok(category) => {
            metrics::record_change("category", "create");
            Ok((StatusCode::CREATED, data(category)))
        }
        Err(e) => {
            if let Some(url) = image_url {
                state.images.delete_url(&url).await;
            }
            Err(e.into())
        }
    }
}

/// PATCH /admin/categories/{id} (multipart, partial)
pub async fn update_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<Data<CategorySummary>>> {
    let form = MenuForm::parse(multipart).await?;
    let name = form
        .name
        .as_deref()
        .map(|n| validate_name(n, "Category"))
        .transpose()?;

    // Fail fast before storing a file for a missing category.
    CategoryService::get(&state.db, id).await?;

    let image_url = match &form.image {
        Some(img) => Some(state.images.save(ImageKind::Category, img).await?),
        None => None,
    };

    let changes = CategoryChanges {
        name,
        description: form.description,
        enabled: form.enabled,
        sort_order: form.order,
        image_url,
    };
    let (category, replaced) = CategoryService::update(&state.db, id, &changes).await?;
    if let Some(old) = replaced {
        state.images.delete_url(&old).await;
    }
    metrics::record_change("category", "update");
    Ok(data(category))
}

/// DELETE /admin/categories/{id}
pub async fn delete_category(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Data<Success>>> {
    let deleted = CategoryService::delete(&state.db, id).await?;
    if let Some(url) = deleted.image_url {
        state.images.delete_url(&url).await;
    }
    metrics::record_change("category", "delete");
    Ok(success())
}

/// POST /admin/categories/reorder
pub async fn reorder_categories(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<ReorderCategoriesRequest>,
) -> ApiResult<Json<Data<Success>>> {
    if body.category_ids.is_empty() {
        return Err(ServiceError::validation("categoryIds must not be empty").into());
    }
    CategoryService::reorder(&state.db, &body.category_ids).await?;
    metrics::record_change("category", "reorder");
    Ok(success())
}
