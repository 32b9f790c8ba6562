use axum::{extract::State, http::StatusCode, Json};
use redis::AsyncCommands;
use serde_json::{json, Value};

use crate::AppState;

/// GET /health. Reports the database and Redis separately; only the
/// database is required for a 200.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut redis = state.redis.clone();
    let ping: redis::RedisResult<bool> = redis.exists("health:check").await;
    let redis_status = match ping {
        Ok(_) => "connected".to_string(),
        Err(e) => e.to_string(),
    };

    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "db": "connected", "redis": redis_status })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "error", "db": e.to_string(), "redis": redis_status })),
        ),
    }
}
