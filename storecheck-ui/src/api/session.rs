//! Working-session API
//!
//! All state flows through the single `InspectionSession` behind the app
//! state lock; handlers never touch the database directly for the
//! inspection flow.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use storecheck_common::models::{ItemUpdate, StoreInfo};
use storecheck_common::Error;

use crate::api::ApiError;
use crate::AppState;

/// GET /api/session
///
/// Complete working state for the checklist UI.
pub async fn get_session(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.lock().await;
    Json(json!({
        "phase": session.phase(),
        "store_info": session.store_info(),
        "categories": session.categories(),
        "completion": session.completion_status(),
        "last_error": session.last_error(),
    }))
}

/// PUT /api/session/store-info
pub async fn set_store_info(
    State(state): State<AppState>,
    Json(info): Json<StoreInfo>,
) -> Result<Json<Value>, ApiError> {
    let mut session = state.session.lock().await;
    session.set_store_info(info)?;
    Ok(Json(json!({
        "store_info": session.store_info(),
        "ready": session.store_info().is_complete(),
    })))
}

/// PUT /api/session/categories/:category_id/items/:item_id
///
/// Overlays a partial update onto one item. An unknown pair leaves the
/// session untouched and reports 404.
pub async fn update_session_item(
    State(state): State<AppState>,
    Path((category_id, item_id)): Path<(String, String)>,
    Json(update): Json<ItemUpdate>,
) -> Result<Json<Value>, ApiError> {
    let mut session = state.session.lock().await;
    let applied = session.update_item(&category_id, &item_id, update)?;
    if !applied {
        return Err(Error::NotFound(format!(
            "item '{}' in category '{}'",
            item_id, category_id
        ))
        .into());
    }

    Ok(Json(json!({
        "completion": session.completion_status(),
        "category_complete": session.is_category_complete(&category_id),
    })))
}

/// GET /api/session/completion
pub async fn get_completion(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.lock().await;
    Json(json!(session.completion_status()))
}

/// GET /api/session/issues
///
/// Items currently answered "no", for the review screen.
pub async fn get_session_issues(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.lock().await;
    Json(json!(session.all_issues()))
}

/// POST /api/session/reset
///
/// Destructive: discards all progress without confirmation. Any
/// confirmation dialog is the UI's responsibility.
pub async fn reset_session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut session = state.session.lock().await;
    session.reset(&state.provider).await?;
    Ok(Json(json!({
        "status": "reset",
        "completion": session.completion_status(),
    })))
}
