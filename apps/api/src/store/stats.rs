#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::stats::MonthlyStatsRow;

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Writes the row for its `(user_id, month)` key, overwriting every
    /// non-key column on conflict. A single conflict-checked statement —
    /// concurrent upserts for the same key cannot interleave.
    async fn upsert(&self, row: &MonthlyStatsRow) -> Result<(), StoreError>;

    /// All aggregate rows for the user, newest month first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MonthlyStatsRow>, StoreError>;
}

pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn upsert(&self, row: &MonthlyStatsRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO application_stats
                (user_id, month, total_applications, applied_count, screening_count,
                 interview_count, offer_count, rejected_count, avg_response_days)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, month)
            DO UPDATE SET
                total_applications = EXCLUDED.total_applications,
                applied_count = EXCLUDED.applied_count,
                screening_count = EXCLUDED.screening_count,
                interview_count = EXCLUDED.interview_count,
                offer_count = EXCLUDED.offer_count,
                rejected_count = EXCLUDED.rejected_count,
                avg_response_days = EXCLUDED.avg_response_days
            "#,
        )
        .bind(row.user_id)
        .bind(row.month)
        .bind(row.total_applications)
        .bind(row.applied_count)
        .bind(row.screening_count)
        .bind(row.interview_count)
        .bind(row.offer_count)
        .bind(row.rejected_count)
        .bind(row.avg_response_days)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MonthlyStatsRow>, StoreError> {
        Ok(sqlx::query_as::<_, MonthlyStatsRow>(
            "SELECT * FROM application_stats WHERE user_id = $1 ORDER BY month DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[derive(Default)]
pub struct InMemoryStatsStore {
    rows: RwLock<HashMap<(Uuid, NaiveDate), MonthlyStatsRow>>,
}

impl InMemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for InMemoryStatsStore {
    async fn upsert(&self, row: &MonthlyStatsRow) -> Result<(), StoreError> {
        let mut rows = self.rows.write().unwrap();
        rows.insert((row.user_id, row.month), row.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MonthlyStatsRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| std::cmp::Reverse(r.month));
        Ok(result)
    }
}
