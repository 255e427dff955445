//! Checklist taxonomy administration
//!
//! Category and item CRUD against the data provider. Taxonomy edits are
//! independent of any in-progress inspection: the working session keeps
//! its snapshot until it is reset or submitted.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use storecheck_common::db::ChecklistProvider;
use storecheck_common::models::{
    Category, CategoryCreate, CategoryUpdate, ChecklistItem, ItemCreate,
};

use crate::api::ApiError;
use crate::AppState;

/// GET /api/admin/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.provider.fetch_taxonomy().await?))
}

/// POST /api/admin/categories
pub async fn create_category(
    State(state): State<AppState>,
    Json(create): Json<CategoryCreate>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.provider.create_category(create).await?))
}

/// PUT /api/admin/categories/:id
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CategoryUpdate>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.provider.update_category(&id, update).await?))
}

/// DELETE /api/admin/categories/:id
///
/// Cascades to the category's items.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.provider.delete_category(&id).await?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}

/// POST /api/admin/categories/:id/items
pub async fn create_item(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(create): Json<ItemCreate>,
) -> Result<Json<ChecklistItem>, ApiError> {
    Ok(Json(state.provider.create_item(&category_id, create).await?))
}

#[derive(Debug, serde::Deserialize)]
pub struct ItemDescriptionUpdate {
    pub description: String,
}

/// PUT /api/admin/items/:id
pub async fn update_item_description(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<ItemDescriptionUpdate>,
) -> Result<Json<ChecklistItem>, ApiError> {
    Ok(Json(
        state
            .provider
            .update_item_description(&id, &update.description)
            .await?,
    ))
}

/// DELETE /api/admin/items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.provider.delete_item(&id).await?;
    Ok(Json(json!({ "status": "deleted", "id": id })))
}
