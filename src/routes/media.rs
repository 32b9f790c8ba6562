use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiResult, ServiceError},
    models::auth::AuthenticatedAdmin,
    routes::{data, forms::MenuForm, Data},
    services::{images::ImageKind, metrics},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedUrl {
    pub url: String,
}

/// POST /admin/uploads?kind=menu-item
///
/// Stores a standalone image and returns its URL, for forms that send JSON
/// (menu items) rather than multipart.
pub async fn upload_image(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Data<UploadedUrl>>)> {
    let kind = ImageKind::from_name(&query.kind)
        .ok_or_else(|| ServiceError::validation(format!("Unknown image kind: {}", query.kind)))?;
    let form = MenuForm::parse(multipart).await?;
    let image = form
        .image
        .ok_or_else(|| ServiceError::validation("No image provided"))?;

    let url = state.images.save(kind, &image).await?;
    metrics::record_upload(kind.label());
    Ok((StatusCode::CREATED, data(UploadedUrl { url })))
}

/// GET /media/{*path}
pub async fn serve_media(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, StatusCode> {
    let file_path = state.images.resolve(&path).ok_or(StatusCode::NOT_FOUND)?;

    let bytes = tokio::fs::read(&file_path)
        .await
        .map_err(|_| StatusCode::NOT_FOUND)?;
    let content_type = mime_guess::from_path(&file_path)
        .first_raw()
        .unwrap_or("application/octet-stream");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, bytes.len().to_string())
        // Stored names are random, so a file never changes in place.
        .header(header::CACHE_CONTROL, "public, max-age=31536000, immutable")
        .body(Body::from(bytes))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
