//! Admin dashboard: recent inspections and the flattened issue view

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use storecheck_common::db::ChecklistProvider;
use storecheck_common::models::InspectionRecord;
use storecheck_common::submission;

use crate::api::ApiError;
use crate::AppState;

const LIMIT_CAP: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub limit: Option<i64>,
}

/// Effective listing limit: query parameter, else the configured default
async fn recent_limit(state: &AppState, requested: Option<i64>) -> Result<i64, ApiError> {
    if let Some(limit) = requested {
        return Ok(limit.clamp(1, LIMIT_CAP));
    }

    let configured: Option<i64> = sqlx::query_scalar(
        "SELECT CAST(value AS INTEGER) FROM settings WHERE key = 'recent_inspections_limit'",
    )
    .fetch_optional(&state.db)
    .await
    .map_err(storecheck_common::Error::from)?;

    Ok(configured.unwrap_or(50).clamp(1, LIMIT_CAP))
}

/// GET /api/admin/inspections?limit=N
///
/// Most recent inspections first.
pub async fn list_inspections(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Vec<InspectionRecord>>, ApiError> {
    let limit = recent_limit(&state, query.limit).await?;
    Ok(Json(state.provider.list_recent_inspections(limit).await?))
}

/// GET /api/admin/issues?limit=N
///
/// Every "no" answer across the N most recent inspections, flattened.
pub async fn list_issues(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = recent_limit(&state, query.limit).await?;
    let inspections = state.provider.list_recent_inspections(limit).await?;
    let issues = submission::flatten_issues(&inspections);

    Ok(Json(json!({
        "issues": issues,
        "inspections_scanned": inspections.len(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct IssueStatusUpdate {
    pub inspection_id: String,
    pub category_id: String,
    pub item_id: String,
    pub fixed: bool,
}

/// PUT /api/admin/issues/status
///
/// Flips one issue's `fixed` flag. A concurrent rewrite of the same
/// inspection surfaces as 409 rather than silently losing a change.
pub async fn update_issue_status(
    State(state): State<AppState>,
    Json(update): Json<IssueStatusUpdate>,
) -> Result<Json<InspectionRecord>, ApiError> {
    let record = submission::update_issue_status(
        &state.provider,
        &update.inspection_id,
        &update.category_id,
        &update.item_id,
        update.fixed,
    )
    .await?;

    Ok(Json(record))
}
