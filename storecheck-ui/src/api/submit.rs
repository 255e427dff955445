//! Submission endpoints

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::warn;

use storecheck_common::models::InspectionRecord;
use storecheck_common::submission;

use crate::api::ApiError;
use crate::AppState;

/// POST /api/session/submit
///
/// Validates and shapes the working state, performs the single durable
/// write, and on success destroys the working state so a fresh inspection
/// begins. Failure leaves the working state intact for a manual retry;
/// there is no automatic retry.
pub async fn submit_session(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut session = state.session.lock().await;

    // Validation failures surface before any write happens
    let payload = session.prepare_submission()?;

    session.mark_submitting();
    match submission::submit(&state.provider, &payload).await {
        Ok(id) => {
            session.mark_submitted();
            if let Err(e) = session.reset(&state.provider).await {
                // The inspection is durably recorded either way
                warn!("Post-submission reset failed: {}", e);
            }
            Ok(Json(json!({ "id": id })))
        }
        Err(e) => {
            session.mark_submit_failed(&e);
            Err(e.into())
        }
    }
}

/// GET /api/inspections/:id
///
/// Confirmation view data, keyed by the id returned from submit.
pub async fn get_inspection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InspectionRecord>, ApiError> {
    use storecheck_common::db::ChecklistProvider;
    Ok(Json(state.provider.get_inspection(&id).await?))
}
