//! Pooled SQL backend
//!
//! One query per operation against the configured table:
//! - update/delete decide not-found from the affected row count
//! - insert binds exactly the five capture fields and returns the row

use std::time::{Duration, Instant};

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DbError, ItemStore};
use crate::models::{Item, ItemId, ItemUpdate, NewItem, TableName, UpdatedItem};

const ITEM_COLUMNS: &str = "id, location, contacts, image, call_logs, sms, name, description";

/// Item repository over a Postgres pool
#[derive(Clone)]
pub struct PgItemStore {
    pool: PgPool,
    table: TableName,
}

impl PgItemStore {
    pub fn new(pool: PgPool, table: TableName) -> Self {
        Self { pool, table }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list_all(&self) -> Result<Vec<Item>, DbError> {
        let sql = format!("SELECT {} FROM {}", ITEM_COLUMNS, self.table);
        let items = sqlx::query_as::<_, Item>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn get_by_id(&self, id: ItemId) -> Result<Item, DbError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", ITEM_COLUMNS, self.table);
        sqlx::query_as::<_, Item>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn insert(&self, item: NewItem) -> Result<Item, DbError> {
        let sql = format!(
            r#"
            INSERT INTO {} (location, contacts, image, call_logs, sms)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            self.table, ITEM_COLUMNS
        );

        let created = sqlx::query_as::<_, Item>(&sql)
            .bind(item.location)
            .bind(item.contacts)
            .bind(item.image)
            .bind(item.call_logs)
            .bind(item.sms)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn update_by_id(&self, id: ItemId, update: ItemUpdate) -> Result<UpdatedItem, DbError> {
        let sql = format!(
            r#"
            UPDATE {}
            SET name = $1, description = $2
            WHERE id = $3
            RETURNING id, name, description
            "#,
            self.table
        );

        sqlx::query_as::<_, UpdatedItem>(&sql)
            .bind(update.name)
            .bind(update.description)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::item_not_found(id))
    }

    async fn delete_by_id(&self, id: ItemId) -> Result<(), DbError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::item_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<Duration, DbError> {
        let started = Instant::now();
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(started.elapsed())
    }
}
