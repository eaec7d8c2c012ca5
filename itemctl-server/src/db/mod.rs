//! Database layer - the `ItemStore` seam and its backends
//!
//! # Design Principles
//!
//! - One trait, three interchangeable backends (pooled SQL, hosted PostgREST, memory)
//! - Not-found is decided by the store (zero rows matched), everything else is a failure
//! - No retries here; callers decide what a failure means

pub mod hosted;
pub mod memory;
pub mod pool;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{Item, ItemId, ItemUpdate, NewItem, UpdatedItem};

pub use hosted::{HostedConfig, HostedItemStore};
pub use memory::MemoryItemStore;
pub use pool::{create_pool, PoolConfig};
pub use postgres::PgItemStore;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub fn item_not_found(id: ItemId) -> Self {
        Self::NotFound {
            resource: "item",
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Data access for the items table.
///
/// Shared between the route layer and the health monitor as
/// `Arc<dyn ItemStore>`.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Short backend name for logs and `/health`.
    fn backend(&self) -> &'static str;

    /// All items in storage order.
    async fn list_all(&self) -> Result<Vec<Item>, DbError>;

    async fn get_by_id(&self, id: ItemId) -> Result<Item, DbError>;

    /// Insert exactly the five capture fields; the id is generated.
    async fn insert(&self, item: NewItem) -> Result<Item, DbError>;

    /// Overwrite `name` and `description` only.
    async fn update_by_id(&self, id: ItemId, update: ItemUpdate) -> Result<UpdatedItem, DbError>;

    async fn delete_by_id(&self, id: ItemId) -> Result<(), DbError>;

    /// Trivial round-trip, returns the measured latency.
    async fn ping(&self) -> Result<Duration, DbError>;
}
