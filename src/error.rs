use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Error returned by the service layer. Routes turn it into a JSON error body.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Io(_) | ServiceError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Postgres unique-violation is surfaced as a conflict instead of a 500.
pub fn map_unique_violation(e: sqlx::Error, msg: &str) -> ServiceError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            ServiceError::Conflict(msg.to_string())
        }
        _ => ServiceError::Database(e),
    }
}

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = Result<T, ApiError>;

pub fn api_error(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "message": message.to_string() })))
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status = e.status();
        if status.is_server_error() {
            tracing::error!("request failed: {e}");
            // Internal details stay in the logs.
            return api_error(status, "Internal server error");
        }
        api_error(status, e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_variant() {
        assert_eq!(ServiceError::NotFound("Category").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::validation("bad").status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::Database(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let (status, Json(body)) =
            ApiError::from(ServiceError::Other(anyhow::anyhow!("secret dsn leaked")));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");

        let (status, Json(body)) = ApiError::from(ServiceError::NotFound("Menu item"));
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Menu item not found");
    }
}
