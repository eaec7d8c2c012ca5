//! API error types with IntoResponse
//!
//! Every failure leaves as JSON with an `error` field. Data-access failures
//! are logged with their cause and answered with a generic per-route message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::DbError;

/// Body returned for any id that matches no row
pub const ITEM_NOT_FOUND: &str = "Item not found";

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// No row matched the id (404)
    NotFound,

    /// Request body could not be read as the expected JSON (4xx)
    InvalidBody { status: StatusCode, message: String },

    /// Data access failed (500, logged)
    Database { action: &'static str, source: DbError },
}

impl ApiError {
    /// Map a store error for the route doing `action` ("fetch items", ...).
    ///
    /// ```ignore
    /// store.list_all().await.map_err(ApiError::db("fetch items"))?;
    /// ```
    pub fn db(action: &'static str) -> impl FnOnce(DbError) -> Self {
        move |source| {
            if source.is_not_found() {
                Self::NotFound
            } else {
                Self::Database { action, source }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound => (StatusCode::NOT_FOUND, ITEM_NOT_FOUND.to_string()),
            Self::InvalidBody { status, message } => (status, message),
            Self::Database { action, source } => {
                // Log the actual error, return generic message
                tracing::error!(error = %source, "failed to {}", action);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to {}", action),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
