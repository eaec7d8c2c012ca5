//! Item record and request payloads
//!
//! The five capture fields (`location`, `contacts`, `image`, `call_logs`,
//! `sms`) are opaque JSON passed through to storage untouched. `name` and
//! `description` are only ever written by an update.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Item identifier, generated by the database
pub type ItemId = i64;

/// Item record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    #[serde(default)]
    pub location: Option<JsonValue>,
    #[serde(default)]
    pub contacts: Option<JsonValue>,
    #[serde(default)]
    pub image: Option<JsonValue>,
    #[serde(default)]
    pub call_logs: Option<JsonValue>,
    #[serde(default)]
    pub sms: Option<JsonValue>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Fields accepted at creation. Absent fields are stored as NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub location: Option<JsonValue>,
    #[serde(default)]
    pub contacts: Option<JsonValue>,
    #[serde(default)]
    pub image: Option<JsonValue>,
    #[serde(default)]
    pub call_logs: Option<JsonValue>,
    #[serde(default)]
    pub sms: Option<JsonValue>,
}

impl NewItem {
    /// Build the stored record once the database has assigned an id.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            location: self.location,
            contacts: self.contacts,
            image: self.image,
            call_logs: self.call_logs,
            sms: self.sms,
            name: None,
            description: None,
        }
    }
}

/// Fields accepted by an update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update result: the id plus the two fields that were written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UpdatedItem {
    pub id: ItemId,
    pub name: Option<String>,
    pub description: Option<String>,
}
