//! In-process backend for tests and `--backend memory`
//!
//! Ids are assigned from a counter starting at 1 and never reused. The
//! store can be switched offline to exercise failure paths without a
//! database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{DbError, ItemStore};
use crate::models::{Item, ItemId, ItemUpdate, NewItem, UpdatedItem};

#[derive(Default)]
struct Rows {
    last_id: ItemId,
    items: BTreeMap<ItemId, Item>,
}

/// Item store held in memory
#[derive(Default)]
pub struct MemoryItemStore {
    rows: RwLock<Rows>,
    offline: AtomicBool,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `DbError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), DbError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Rows>, DbError> {
        self.check_online()?;
        self.rows
            .read()
            .map_err(|_| DbError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows>, DbError> {
        self.check_online()?;
        self.rows
            .write()
            .map_err(|_| DbError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list_all(&self) -> Result<Vec<Item>, DbError> {
        Ok(self.read()?.items.values().cloned().collect())
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item, DbError> {
        self.read()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn insert(&self, item: NewItem) -> Result<Item, DbError> {
        let mut rows = self.write()?;
        rows.last_id += 1;
        let created = item.into_item(rows.last_id);
        rows.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_by_id(&self, id: ItemId, update: ItemUpdate) -> Result<UpdatedItem, DbError> {
        let mut rows = self.write()?;
        let item = rows
            .items
            .get_mut(&id)
            .ok_or_else(|| DbError::item_not_found(id))?;

        item.name = update.name;
        item.description = update.description;

        Ok(UpdatedItem {
            id,
            name: item.name.clone(),
            description: item.description.clone(),
        })
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<(), DbError> {
        self.write()?
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn ping(&self) -> Result<Duration, DbError> {
        let started = Instant::now();
        self.check_online()?;
        Ok(started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_item(tag: &str) -> NewItem {
        NewItem {
            location: Some(json!(tag)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = MemoryItemStore::new();
        let first = store.insert(new_item("a")).await.unwrap();
        store.delete_by_id(first.id).await.unwrap();
        let second = store.insert(new_item("b")).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn update_leaves_capture_fields_alone() {
        let store = MemoryItemStore::new();
        let created = store.insert(new_item("here")).await.unwrap();

        store
            .update_by_id(
                created.id,
                ItemUpdate {
                    name: Some("N".into()),
                    description: None,
                },
            )
            .await
            .unwrap();

        let fetched = store.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.location, Some(json!("here")));
        assert_eq!(fetched.name.as_deref(), Some("N"));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = MemoryItemStore::new();
        assert!(store.get_by_id(1).await.unwrap_err().is_not_found());
        assert!(store.delete_by_id(1).await.unwrap_err().is_not_found());
        assert!(store
            .update_by_id(1, ItemUpdate::default())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn offline_fails_everything() {
        let store = MemoryItemStore::new();
        store.set_offline(true);

        assert!(matches!(store.ping().await, Err(DbError::Unavailable(_))));
        assert!(matches!(store.list_all().await, Err(DbError::Unavailable(_))));

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }
}
