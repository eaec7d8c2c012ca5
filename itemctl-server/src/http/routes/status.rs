//! Database status endpoint
//!
//! GET /status - probes the store on demand. Unlike the other routes, the
//! failure body echoes the underlying error text.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::http::server::AppState;

/// Status probe response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// GET /status
async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusResponse>) {
    match state.store.ping().await {
        Ok(latency) => (
            StatusCode::OK,
            Json(StatusResponse {
                status: "connected",
                message: "Database connection is healthy",
                latency_ms: Some(latency.as_millis() as u64),
                error: None,
                timestamp: now(),
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "status probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse {
                    status: "disconnected",
                    message: "Database connection failed",
                    latency_ms: None,
                    error: Some(e.to_string()),
                    timestamp: now(),
                }),
            )
        }
    }
}

/// Status routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(status))
}
