use axum::http::StatusCode;

use crate::error::{api_error, ApiError};

/// Checks an email-keyed rate limit stored in Redis.
///
/// Uses the INCR + EXPIRE strategy:
/// - Increments a counter for `key`
/// - On first increment, sets TTL to `window_secs`
/// - Returns 429 if counter exceeds `max_attempts`
///
/// Redis being unreachable does not block logins.
pub async fn check_rate_limit(
    redis: &mut redis::aio::MultiplexedConnection,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), ApiError> {
    let count: u64 = match redis::cmd("INCR").arg(key).query_async(redis).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("rate limit check skipped, redis error: {e}");
            return Ok(());
        }
    };

    if count == 1 {
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(redis)
            .await;
    }

    if exceeded(count, max_attempts) {
        return Err(api_error(
            StatusCode::TOO_MANY_REQUESTS,
            "Too many attempts. Try again in a few minutes.",
        ));
    }

    Ok(())
}

pub fn login_key(email: &str) -> String {
    format!("rate:login:{}", email.trim().to_lowercase())
}

fn exceeded(count: u64, max_attempts: u64) -> bool {
    count > max_attempts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_case_insensitive() {
        assert_eq!(login_key(" Admin@Lounge.test "), "rate:login:admin@lounge.test");
    }

    #[test]
    fn limit_allows_exactly_max_attempts() {
        assert!(!exceeded(5, 5));
        assert!(exceeded(6, 5));
    }
}
