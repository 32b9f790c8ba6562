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
        category::validate_name,
        pagination::{Page, PaginationMeta},
        section::{NewSection, ReorderSectionsRequest, Section, SectionChanges, SectionQuery},
        temporary_price::SetEnabledRequest,
    },
    routes::{data, forms::MenuForm, success, Data, Paginated, Success},
    services::{images::ImageKind, metrics, sections::SectionService},
    AppState,
};

pub async fn list_sections(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<SectionQuery>,
) -> ApiResult<Json<Paginated<Section>>> {
    let page = Page::new(query.page, query.per_page);
    let (rows, total) = SectionService::list(&state.db, &query, page).await?;
    Ok(Json(Paginated {
        data: rows,
        meta: PaginationMeta::new(total, page, "/admin/sections"),
    }))
}

pub async fn get_section(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Data<Section>>> {
    Ok(data(SectionService::get(&state.db, id).await?))
}

pub async fn create_section(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Data<Section>>)> {
    let form = MenuForm::parse(multipart).await?;
    let category_id = form
        .category_id
        .ok_or_else(|| ServiceError::validation("categoryId is required"))?;
    let name = validate_name(form.name.as_deref().unwrap_or(""), "Section")?;

    let image_url = match &form.image {
        Some(img) => {
            let url = state.images.save(ImageKind::Section, img).await?;
            metrics::record_upload(ImageKind::Section.label());
            Some(url)
        }
        None => None,
    };

    let input = NewSection {
        category_id,
        name,
        description: form.description,
        enabled: form.enabled.unwrap_or(true),
        sort_order: form.order,
        image_url: image_url.clone(),
    };

    match SectionService::create(&state.db, &input).await {
        Ok(section) => {
            metrics::record_change("section", "create");
            Ok((StatusCode::CREATED, data(section)))
        }
        Err(e) => {
            if let Some(url) = image_url {
                state.images.delete_url(&url).await;
            }
            Err(e.into())
        }
    }
}

pub async fn update_section(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<Data<Section>>> {
    let form = MenuForm::parse(multipart).await?;
    let name = form
        .name
        .as_deref()
        .map(|n| validate_name(n, "Section"))
        .transpose()?;

    SectionService::get(&state.db, id).await?;

    let image_url = match &form.image {
        Some(img) => {
            let url = state.images.save(ImageKind::Section, img).await?;
            metrics::record_upload(ImageKind::Section.label());
            Some(url)
        }
        None => None,
    };

    let changes = SectionChanges {
        category_id: form.category_id,
        name,
        description: form.description,
        enabled: form.enabled,
        sort_order: form.order,
        image_url,
    };
    let (section, replaced) = SectionService::update(&state.db, id, &changes).await?;
    if let Some(old) = replaced {
        state.images.delete_url(&old).await;
    }
    metrics::record_change("section", "update");
    Ok(data(section))
}

/// PATCH /admin/sections/{id}/enabled
pub async fn set_section_enabled(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
    Json(body): Json<SetEnabledRequest>,
) -> ApiResult<Json<Data<Section>>> {
    let section = SectionService::set_enabled(&state.db, id, body.enabled).await?;
    metrics::record_change("section", if body.enabled { "enable" } else { "disable" });
    Ok(data(section))
}

pub async fn delete_section(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Data<Success>>> {
    let deleted = SectionService::delete(&state.db, id).await?;
    if let Some(url) = deleted.image_url {
        state.images.delete_url(&url).await;
    }
    metrics::record_change("section", "delete");
    Ok(success())
}

pub async fn reorder_sections(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(body): Json<ReorderSectionsRequest>,
) -> ApiResult<Json<Data<Success>>> {
    if body.section_ids.is_empty() {
        return Err(ServiceError::validation("sectionIds must not be empty").into());
    }
    SectionService::reorder(&state.db, body.category_id, &body.section_ids).await?;
    metrics::record_change("section", "reorder");
    Ok(success())
}
