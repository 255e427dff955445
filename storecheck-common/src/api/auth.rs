//! Admin API authentication
//!
//! Admin requests carry two headers: a millisecond Unix timestamp and a
//! SHA-256 token over `"{timestamp}:{secret}"`. The shared secret is a
//! random non-zero i64 stored in the settings table; the special value 0
//! disables auth checking entirely (used by tests and first-run setups
//! before a secret is provisioned).
//!
//! This module contains only pure functions and database operations; the
//! axum middleware lives with the service.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::SqlitePool;

/// Settings key holding the shared secret
pub const SHARED_SECRET_KEY: &str = "admin_shared_secret";

/// Accepted clock skew: requests may be up to 30s old
pub const MAX_TIMESTAMP_AGE_MS: i64 = 30_000;

/// and up to 1s in the future
pub const MAX_TIMESTAMP_FUTURE_MS: i64 = 1_000;

/// Authentication error types
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp { timestamp: i64, now: i64, reason: String },

    /// Token does not match calculated value
    InvalidToken,

    /// Required auth header missing or malformed
    MissingCredentials(String),

    /// Database error loading shared secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            ApiAuthError::InvalidToken => write!(f, "Invalid token"),
            ApiAuthError::MissingCredentials(what) => write!(f, "Missing credentials: {}", what),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

/// Load the shared secret, generating and storing one on first access
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(SHARED_SECRET_KEY)
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate a random non-zero secret and store it
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let mut rng = rand::thread_rng();
    let secret: i64 = loop {
        let val = rng.gen::<i64>();
        if val != 0 {
            break val;
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)")
        .bind(SHARED_SECRET_KEY)
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// Validate the request timestamp against the accepted window
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    let now = now_ms();
    let diff = now - timestamp;

    if diff > MAX_TIMESTAMP_AGE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("{}ms too old (max {}ms)", diff, MAX_TIMESTAMP_AGE_MS),
        });
    }

    if diff < -MAX_TIMESTAMP_FUTURE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "{}ms in future (max {}ms)",
                diff.abs(),
                MAX_TIMESTAMP_FUTURE_MS
            ),
        });
    }

    Ok(())
}

/// Token for a given timestamp: SHA-256 of `"{timestamp}:{secret}"`, as 64
/// hex characters
pub fn admin_token(timestamp: i64, shared_secret: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", timestamp, shared_secret).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-shape comparison of the provided token against the calculated one
pub fn validate_token(
    provided: &str,
    timestamp: i64,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = admin_token(timestamp, shared_secret);
    if provided != calculated {
        return Err(ApiAuthError::InvalidToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_timestamp_accepted() {
        let now = now_ms();
        assert!(validate_timestamp(now).is_ok());
        assert!(validate_timestamp(now - 5_000).is_ok());
        assert!(validate_timestamp(now - MAX_TIMESTAMP_AGE_MS).is_ok());
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let now = now_ms();
        assert!(validate_timestamp(now - MAX_TIMESTAMP_AGE_MS - 100).is_err());
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let now = now_ms();
        assert!(validate_timestamp(now + 500).is_ok());
        assert!(validate_timestamp(now + MAX_TIMESTAMP_FUTURE_MS + 100).is_err());
    }

    #[test]
    fn test_token_shape_and_determinism() {
        let token = admin_token(1730000000000, 123456789);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(token, admin_token(1730000000000, 123456789));
        assert_ne!(token, admin_token(1730000000000, 987654321));
        assert_ne!(token, admin_token(1730000000001, 123456789));
    }

    #[test]
    fn test_token_validation() {
        let ts = 1730000000000;
        let secret = 42;
        let token = admin_token(ts, secret);
        assert!(validate_token(&token, ts, secret).is_ok());
        assert!(validate_token(&token, ts + 1, secret).is_err());
        assert!(validate_token("bogus", ts, secret).is_err());
    }
}
