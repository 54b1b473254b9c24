#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::resume::ResumeRow;

#[async_trait]
pub trait ResumeStore: Send + Sync {
    async fn insert(&self, row: ResumeRow) -> Result<ResumeRow, StoreError>;

    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError>;

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError>;

    /// Makes the given resume the user's only default: unsets every sibling
    /// and sets the target in one transaction. Returns false when the target
    /// does not exist or is not owned by the user (nothing is changed then).
    async fn set_default(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, row: ResumeRow) -> Result<ResumeRow, StoreError> {
        let inserted = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, user_id, file_name, file_url, extracted_text, version,
                 uploaded_at, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.file_name)
        .bind(row.file_url)
        .bind(row.extracted_text)
        .bind(row.version)
        .bind(row.uploaded_at)
        .bind(row.is_default)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE user_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        Ok(
            sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn set_default(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE resumes SET is_default = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE resumes SET is_default = FALSE WHERE user_id = $1 AND id <> $2")
            .bind(user_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[derive(Default)]
pub struct InMemoryResumeStore {
    rows: RwLock<HashMap<Uuid, ResumeRow>>,
}

impl InMemoryResumeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResumeStore for InMemoryResumeStore {
    async fn insert(&self, row: ResumeRow) -> Result<ResumeRow, StoreError> {
        let mut rows = self.rows.write().unwrap();
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<ResumeRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| std::cmp::Reverse(r.uploaded_at));
        Ok(result)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.get(&id).filter(|r| r.user_id == user_id).cloned())
    }

    async fn set_default(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        if !rows
            .get(&id)
            .map(|r| r.user_id == user_id)
            .unwrap_or(false)
        {
            return Ok(false);
        }
        for row in rows.values_mut().filter(|r| r.user_id == user_id) {
            row.is_default = row.id == id;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_resume(user_id: Uuid, is_default: bool) -> ResumeRow {
        ResumeRow {
            id: Uuid::new_v4(),
            user_id,
            file_name: "resume.pdf".to_string(),
            file_url: None,
            extracted_text: Some("Experienced engineer".to_string()),
            version: "v1".to_string(),
            uploaded_at: Utc::now(),
            is_default,
        }
    }

    #[tokio::test]
    async fn set_default_unsets_siblings() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let first = store.insert(sample_resume(user, true)).await.unwrap();
        let second = store.insert(sample_resume(user, false)).await.unwrap();

        assert!(store.set_default(second.id, user).await.unwrap());

        let rows = store.list(user).await.unwrap();
        let defaults: Vec<_> = rows.iter().filter(|r| r.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
        assert!(!rows.iter().any(|r| r.id == first.id && r.is_default));
    }

    #[tokio::test]
    async fn set_default_rejects_unowned_resume() {
        let store = InMemoryResumeStore::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();
        let row = store.insert(sample_resume(user, false)).await.unwrap();

        assert!(!store.set_default(row.id, other).await.unwrap());
        let rows = store.list(user).await.unwrap();
        assert!(!rows[0].is_default);
    }
}
