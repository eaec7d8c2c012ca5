//! Domain models
//!
//! Item payloads pass through unvalidated; only configuration that ends up
//! inside SQL text (the table name) is checked at construction.

pub mod validation;
pub mod table;
pub mod item;

pub use validation::ValidationError;
pub use table::TableName;
pub use item::{Item, ItemId, ItemUpdate, NewItem, UpdatedItem};
