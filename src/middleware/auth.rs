use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::{api_error, ApiError};
use crate::models::auth::{AuthenticatedAdmin, Claims};

impl<S> FromRequestParts<S> for AuthenticatedAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| api_error(StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            api_error(StatusCode::UNAUTHORIZED, "Invalid Authorization header format")
        })?;

        let secret = parts.extensions.get::<JwtSecret>().ok_or_else(|| {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "JWT secret not configured")
        })?;

        decode_access_token(token, &secret.0)
            .map_err(|_| api_error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
    }
}

/// Extension type to carry the JWT secret through request extensions.
#[derive(Clone)]
pub struct JwtSecret(pub String);

pub fn decode_access_token(token: &str, secret: &str) -> Result<AuthenticatedAdmin, anyhow::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    let claims = data.claims;
    if claims.role != "admin" {
        anyhow::bail!("token is not an admin token");
    }

    Ok(AuthenticatedAdmin {
        admin_id: claims.sub.parse()?,
        email: claims.email,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::AuthService;
    use uuid::Uuid;

    #[test]
    fn issued_token_decodes() {
        let id = Uuid::new_v4();
        let token = AuthService::generate_access_token(id, "admin@lounge.test", "s3cret", 60).unwrap();
        let admin = decode_access_token(&token, "s3cret").unwrap();
        assert_eq!(admin.admin_id, id);
        assert_eq!(admin.email, "admin@lounge.test");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token =
            AuthService::generate_access_token(Uuid::new_v4(), "a@b.c", "s3cret", 60).unwrap();
        assert!(decode_access_token(&token, "other").is_err());
    }

    #[tokio::test]
    async fn extractor_requires_bearer_token() {
        let req = axum::http::Request::builder()
            .uri("/admin/categories")
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        let (status, _) = AuthenticatedAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token =
            AuthService::generate_access_token(Uuid::new_v4(), "a@b.c", "s3cret", 60).unwrap();
        let req = axum::http::Request::builder()
            .uri("/admin/categories")
            .header("Authorization", format!("Bearer {token}"))
            .body(())
            .unwrap();
        let (mut parts, _) = req.into_parts();
        parts.extensions.insert(JwtSecret("s3cret".into()));
        let admin = AuthenticatedAdmin::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(admin.email, "a@b.c");
    }
}
