//! Authentication middleware for the admin API
//!
//! Admin requests carry `x-storecheck-timestamp` (Unix epoch ms) and
//! `x-storecheck-token` (SHA-256 of `"{timestamp}:{secret}"`) headers.
//! Returns 401 Unauthorized when validation fails. Applied to admin routes
//! only; the inspection flow and health endpoint do not use it.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use storecheck_common::api::auth::{validate_timestamp, validate_token, ApiAuthError};

use crate::AppState;

const TIMESTAMP_HEADER: &str = "x-storecheck-timestamp";
const TOKEN_HEADER: &str = "x-storecheck-token";

pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Special case: secret = 0 disables all auth checking
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    let headers = request.headers();

    let timestamp: i64 = headers
        .get(TIMESTAMP_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthError::MissingHeader(TIMESTAMP_HEADER))?
        .parse()
        .map_err(|_| AuthError::MalformedHeader(TIMESTAMP_HEADER))?;

    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AuthError::MissingHeader(TOKEN_HEADER))?
        .to_string();

    validate_timestamp(timestamp).map_err(|e| match e {
        ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
        other => AuthError::Other(other.to_string()),
    })?;

    validate_token(&token, timestamp, state.shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidToken => {
            warn!("Admin token validation failed");
            AuthError::InvalidToken
        }
        other => AuthError::Other(other.to_string()),
    })?;

    Ok(next.run(request).await)
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingHeader(&'static str),
    MalformedHeader(&'static str),
    InvalidTimestamp(String),
    InvalidToken,
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingHeader(name) => {
                (StatusCode::UNAUTHORIZED, format!("Missing header: {}", name))
            }
            AuthError::MalformedHeader(name) => (
                StatusCode::BAD_REQUEST,
                format!("Malformed header: {}", name),
            ),
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Authentication error: {}", msg),
            ),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
