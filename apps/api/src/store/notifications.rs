#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::notification::NotificationRow;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, row: NotificationRow) -> Result<NotificationRow, StoreError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRow>, StoreError>;
}

pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(&self, row: NotificationRow) -> Result<NotificationRow, StoreError> {
        let inserted = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications
                (id, user_id, application_id, kind, message, sent_at, is_read)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.application_id)
        .bind(row.kind)
        .bind(row.message)
        .bind(row.sent_at)
        .bind(row.is_read)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRow>, StoreError> {
        Ok(sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY sent_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[derive(Default)]
pub struct InMemoryNotificationStore {
    rows: RwLock<HashMap<Uuid, NotificationRow>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, row: NotificationRow) -> Result<NotificationRow, StoreError> {
        let mut rows = self.rows.write().unwrap();
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<NotificationRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| std::cmp::Reverse(r.sent_at));
        Ok(result)
    }
}
