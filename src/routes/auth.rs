use axum::{extract::State, Json};

use crate::{
    error::ApiResult,
    middleware::rate_limit::{check_rate_limit, login_key},
    models::auth::{AdminProfile, AuthenticatedAdmin, LoginRequest, LoginResponse},
    routes::{data, success, Data, Success},
    services::{auth::AuthService, metrics},
    AppState,
};

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<Data<LoginResponse>>> {
    // 5 attempts per 15 min per email
    let mut redis = state.redis.clone();
    check_rate_limit(&mut redis, &login_key(&body.email), 5, 900).await?;

    match AuthService::login(
        &state.db,
        &body.email,
        &body.password,
        &state.config.jwt_secret,
        state.config.jwt_expiry_seconds,
    )
    .await
    {
        Ok(res) => {
            metrics::record_login(true);
            tracing::info!(admin_id = %res.user.id, "admin logged in");
            Ok(data(res))
        }
        Err(e) => {
            metrics::record_login(false);
            tracing::warn!("login failed for {}: {}", body.email, e);
            Err(e.into())
        }
    }
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<Data<AdminProfile>>> {
    Ok(data(AuthService::me(&state.db, admin.admin_id).await?))
}

/// POST /auth/logout. Tokens are stateless, so the client drops its copy.
pub async fn logout(admin: AuthenticatedAdmin) -> Json<Data<Success>> {
    tracing::info!(admin_id = %admin.admin_id, "admin logged out");
    success()
}
