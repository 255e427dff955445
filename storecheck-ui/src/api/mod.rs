//! HTTP API handlers for storecheck-ui

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use storecheck_common::Error;

pub mod auth;
pub mod health;
pub mod issues;
pub mod session;
pub mod submit;
pub mod taxonomy;
pub mod ui;

pub use auth::auth_middleware;
pub use health::health_routes;
pub use issues::{list_inspections, list_issues, update_issue_status};
pub use session::{
    get_completion, get_session, get_session_issues, reset_session, set_store_info,
    update_session_item,
};
pub use submit::{get_inspection, submit_session};
pub use taxonomy::{
    create_category, create_item, delete_category, delete_item, list_categories, update_category,
    update_item_description,
};
pub use ui::{serve_app_js, serve_index};

/// Maps crate errors onto HTTP responses
///
/// Validation and bad input are the caller's fault (400), missing records
/// are 404, versioned-write conflicts are 409, everything else is a 500.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
