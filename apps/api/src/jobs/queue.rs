#![allow(dead_code)]

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::types::{Task, TaskCounts, TaskId, TaskStatus, TaskType};
use crate::store::StoreError;

/// The durable work queue. Delivery is at-least-once: a crashed worker
/// leaves its task `claimed`, and an operator re-queues it via [`retry`]
/// (after `fail`) — downstream writes tolerate redelivery because they are
/// ownership-checked.
///
/// [`retry`]: TaskQueue::retry
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Persists the task before returning, so the handle stays valid across
    /// a process restart immediately after.
    async fn enqueue(
        &self,
        task_type: TaskType,
        payload: serde_json::Value,
    ) -> Result<TaskId, StoreError>;

    /// Claims the oldest pending task, optionally restricted to one type.
    /// At most one worker ever holds a given task: the claim flips
    /// `pending` → `claimed` atomically.
    async fn claim(&self, task_type: Option<TaskType>) -> Result<Option<Task>, StoreError>;

    /// Marks a claimed task done, storing the handler's result for polling.
    async fn complete(
        &self,
        id: TaskId,
        result: Option<serde_json::Value>,
    ) -> Result<(), StoreError>;

    /// Marks a claimed task failed, retaining the error for inspection.
    async fn fail(&self, id: TaskId, error: &str) -> Result<(), StoreError>;

    /// Operational re-queue of a failed task. Returns false when the task
    /// does not exist or is not in the failed state.
    async fn retry(&self, id: TaskId) -> Result<bool, StoreError>;

    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError>;

    async fn counts(&self) -> Result<TaskCounts, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    task_type: String,
    payload: serde_json::Value,
    status: String,
    result: Option<serde_json::Value>,
    error: Option<String>,
    enqueued_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        let task_type = TaskType::parse(&row.task_type)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown task type {}", row.task_type)))?;
        let status = TaskStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown task status {}", row.status)))?;
        Ok(Task {
            id: TaskId(row.id),
            task_type,
            payload: row.payload,
            status,
            result: row.result,
            error: row.error,
            enqueued_at: row.enqueued_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgTaskQueue {
    pool: PgPool,
}

impl PgTaskQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskQueue for PgTaskQueue {
    async fn enqueue(
        &self,
        task_type: TaskType,
        payload: serde_json::Value,
    ) -> Result<TaskId, StoreError> {
        let id = TaskId::new();
        sqlx::query(
            "INSERT INTO ai_tasks (id, task_type, payload, status)
             VALUES ($1, $2, $3, 'pending')",
        )
        .bind(id.0)
        .bind(task_type.as_str())
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn claim(&self, task_type: Option<TaskType>) -> Result<Option<Task>, StoreError> {
        // SKIP LOCKED keeps concurrent workers from ever selecting the same
        // pending row; the UPDATE flips it to claimed in the same statement.
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE ai_tasks
            SET status = 'claimed', updated_at = NOW()
            WHERE id = (
                SELECT id FROM ai_tasks
                WHERE status = 'pending' AND ($1::text IS NULL OR task_type = $1)
                ORDER BY enqueued_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .bind(task_type.map(|t| t.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        row.map(Task::try_from).transpose()
    }

    async fn complete(
        &self,
        id: TaskId,
        result: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE ai_tasks SET status = 'done', result = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'claimed'",
        )
        .bind(id.0)
        .bind(result)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fail(&self, id: TaskId, error: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE ai_tasks SET status = 'failed', error = $2, updated_at = NOW()
             WHERE id = $1 AND status = 'claimed'",
        )
        .bind(id.0)
        .bind(error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn retry(&self, id: TaskId) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE ai_tasks SET status = 'pending', error = NULL, updated_at = NOW()
             WHERE id = $1 AND status = 'failed'",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query_as::<_, TaskRow>("SELECT * FROM ai_tasks WHERE id = $1")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Task::try_from).transpose()
    }

    async fn counts(&self) -> Result<TaskCounts, StoreError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM ai_tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let mut counts = TaskCounts::default();
        for (status, n) in rows {
            match status.as_str() {
                "pending" => counts.pending = n,
                "claimed" => counts.claimed = n,
                "done" => counts.done = n,
                "failed" => counts.failed = n,
                _ => {}
            }
        }
        Ok(counts)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation (tests / local dev)
// ────────────────────────────────────────────────────────────────────────────

/// Insertion order doubles as FIFO order, which sidesteps enqueue-timestamp
/// ties in fast tests.
#[derive(Default)]
pub struct InMemoryTaskQueue {
    tasks: RwLock<Vec<Task>>,
}

impl InMemoryTaskQueue {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskQueue for InMemoryTaskQueue {
    async fn enqueue(
        &self,
        task_type: TaskType,
        payload: serde_json::Value,
    ) -> Result<TaskId, StoreError> {
        let now = Utc::now();
        let task = Task {
            id: TaskId::new(),
            task_type,
            payload,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            enqueued_at: now,
            updated_at: now,
        };
        let id = task.id;
        self.tasks.write().unwrap().push(task);
        Ok(id)
    }

    async fn claim(&self, task_type: Option<TaskType>) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().unwrap();
        let claimed = tasks.iter_mut().find(|t| {
            t.status == TaskStatus::Pending && task_type.map_or(true, |ty| t.task_type == ty)
        });
        match claimed {
            Some(task) => {
                task.status = TaskStatus::Claimed;
                task.updated_at = Utc::now();
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }

    async fn complete(
        &self,
        id: TaskId,
        result: Option<serde_json::Value>,
    ) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().unwrap();
        if let Some(task) = tasks
            .iter_mut()
            .find(|t| t.id == id && t.status == TaskStatus::Claimed)
        {
            task.status = TaskStatus::Done;
            task.result = result;
            task.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn fail(&self, id: TaskId, error: &str) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().unwrap();
        if let Some(task) = tasks
            .iter_mut()
            .find(|t| t.id == id && t.status == TaskStatus::Claimed)
        {
            task.status = TaskStatus::Failed;
            task.error = Some(error.to_string());
            task.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn retry(&self, id: TaskId) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().unwrap();
        match tasks
            .iter_mut()
            .find(|t| t.id == id && t.status == TaskStatus::Failed)
        {
            Some(task) => {
                task.status = TaskStatus::Pending;
                task.error = None;
                task.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: TaskId) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().unwrap();
        Ok(tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn counts(&self) -> Result<TaskCounts, StoreError> {
        let tasks = self.tasks.read().unwrap();
        let mut counts = TaskCounts::default();
        for task in tasks.iter() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Claimed => counts.claimed += 1,
                TaskStatus::Done => counts.done += 1,
                TaskStatus::Failed => counts.failed += 1,
            }
        }
        Ok(counts)
    }
}
