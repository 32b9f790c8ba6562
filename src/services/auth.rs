use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::ServiceError,
    models::auth::{Admin, AdminProfile, Claims, LoginResponse},
};

const ADMIN_COLS: &str =
    "id, email, password_hash, first_name, last_name, is_active, created_at, updated_at";

const BCRYPT_COST: u32 = 12;

pub struct AuthService;

impl AuthService {
    /// Validate credentials and issue an access token.
    pub async fn login(
        pool: &PgPool,
        email: &str,
        password: &str,
        jwt_secret: &str,
        access_ttl: u64,
    ) -> Result<LoginResponse, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid credentials".into());

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLS} FROM admins WHERE LOWER(email) = LOWER($1) AND is_active = TRUE"
        ))
        .bind(email.trim())
        .fetch_optional(pool)
        .await?
        .ok_or_else(invalid)?;

        let valid = bcrypt::verify(password, &admin.password_hash).map_err(|_| invalid())?;
        if !valid {
            return Err(invalid());
        }

        let access_token =
            Self::generate_access_token(admin.id, &admin.email, jwt_secret, access_ttl)?;

        Ok(LoginResponse {
            user: admin.into(),
            access_token,
            expires_in: access_ttl,
        })
    }

    pub async fn me(pool: &PgPool, admin_id: Uuid) -> Result<AdminProfile, ServiceError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLS} FROM admins WHERE id = $1 AND is_active = TRUE"
        ))
        .bind(admin_id)
        .fetch_optional(pool)
        .await?
        .ok_or(ServiceError::NotFound("Admin"))?;
        Ok(admin.into())
    }

    /// Create an admin, or reset the password and reactivate it when the
    /// email already exists.
    pub async fn upsert_admin(
        pool: &PgPool,
        email: &str,
        password: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> Result<AdminProfile, ServiceError> {
        if password.len() < 8 {
            return Err(ServiceError::validation("Password must be at least 8 characters"));
        }
        let hash = bcrypt::hash(password, BCRYPT_COST).map_err(anyhow::Error::from)?;

        let admin = sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (email, password_hash, first_name, last_name)
             VALUES (LOWER($1), $2, $3, $4)
             ON CONFLICT (email) DO UPDATE SET
                 password_hash = EXCLUDED.password_hash,
                 first_name = COALESCE(EXCLUDED.first_name, admins.first_name),
                 last_name = COALESCE(EXCLUDED.last_name, admins.last_name),
                 is_active = TRUE,
                 updated_at = NOW()
             RETURNING {ADMIN_COLS}"
        ))
        .bind(email.trim())
        .bind(hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await?;
        Ok(admin.into())
    }

    pub fn generate_access_token(
        admin_id: Uuid,
        email: &str,
        secret: &str,
        ttl: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: admin_id.to_string(),
            email: email.to_string(),
            role: "admin".into(),
            iat: now,
            exp: now + ttl as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }
}
