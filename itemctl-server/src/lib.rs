//! itemctl-server: items REST API with a database health monitor
//!
//! Exposes CRUD over a single items table through one `ItemStore` seam
//! (pooled Postgres, hosted PostgREST, or memory) and watches database
//! connectivity in the background.

pub mod db;
pub mod http;
pub mod models;
pub mod monitor;

use std::sync::Arc;

pub use db::{DbError, ItemStore};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
pub use monitor::{ExitHandler, HealthMonitor, MonitorConfig};

/// Start the health monitor and the HTTP server sharing one store.
///
/// Returns when the server shuts down, or with an error if the monitor
/// gives up first (only reachable with an exit handler that returns).
pub async fn serve(
    store: Arc<dyn ItemStore>,
    server: ServerConfig,
    monitor: MonitorConfig,
    exit: Arc<dyn ExitHandler>,
) -> Result<(), ServerError> {
    let (health, rx) = HealthMonitor::new(store.clone(), monitor, exit);
    let mut monitor_task = health.spawn();

    let state = AppState { store, monitor: rx };

    let result = tokio::select! {
        result = run_server(state, server) => result,
        finished = &mut monitor_task => Err(ServerError::Monitor(finished?)),
    };

    monitor_task.abort();
    result
}
