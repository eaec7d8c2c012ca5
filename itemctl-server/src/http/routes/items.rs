//! Item endpoints
//!
//! Each handler makes exactly one store call. Create takes the five capture
//! fields, update takes `name`/`description`; neither touches the other set.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ItemIdPath, JsonBody};
use crate::http::server::AppState;
use crate::models::{Item, ItemUpdate, NewItem, UpdatedItem};

/// GET /items - list all items
async fn list_items(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Item>>, ApiError> {
    let items = state
        .store
        .list_all()
        .await
        .map_err(ApiError::db("fetch items"))?;
    Ok(Json(items))
}

/// POST /items - create an item from the capture fields
async fn create_item(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<NewItem>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let item = state
        .store
        .insert(req)
        .await
        .map_err(ApiError::db("create item"))?;

    tracing::debug!(id = item.id, "item created");
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /items/{id} - get a single item
async fn get_item(
    State(state): State<Arc<AppState>>,
    ItemIdPath(id): ItemIdPath,
) -> Result<Json<Item>, ApiError> {
    let item = state
        .store
        .get_by_id(id)
        .await
        .map_err(ApiError::db("fetch item"))?;
    Ok(Json(item))
}

/// PUT /items/{id} - overwrite name and description
async fn update_item(
    State(state): State<Arc<AppState>>,
    ItemIdPath(id): ItemIdPath,
    JsonBody(req): JsonBody<ItemUpdate>,
) -> Result<Json<UpdatedItem>, ApiError> {
    let updated = state
        .store
        .update_by_id(id, req)
        .await
        .map_err(ApiError::db("update item"))?;
    Ok(Json(updated))
}

/// DELETE /items/{id} - remove an item
async fn delete_item(
    State(state): State<Arc<AppState>>,
    ItemIdPath(id): ItemIdPath,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete_by_id(id)
        .await
        .map_err(ApiError::db("delete item"))?;

    tracing::debug!(id, "item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Item routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
}
