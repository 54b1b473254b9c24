#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::StoreError;
use crate::models::application::{
    AiSuggestions, ApplicationFilters, ApplicationRow, ApplicationSort, ApplicationStatus,
    TimelineEntry, UpdateApplicationInput,
};

/// Durable application records. All mutating operations are conditioned on
/// `(id, user_id)` — an update against a record the user does not own
/// affects zero rows.
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, row: ApplicationRow) -> Result<ApplicationRow, StoreError>;

    async fn list(
        &self,
        user_id: Uuid,
        filters: &ApplicationFilters,
    ) -> Result<Vec<ApplicationRow>, StoreError>;

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    /// Updates descriptive fields only. Never touches status, timeline or
    /// `last_updated`.
    async fn update_details(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateApplicationInput,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError>;

    /// Atomically sets `status`, refreshes `last_updated` to `entry.date`,
    /// and appends `entry` to the timeline. One statement — no
    /// read-modify-write window.
    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
        entry: TimelineEntry,
    ) -> Result<Option<ApplicationRow>, StoreError>;

    /// Single conditional write of the AI analysis snapshot. Returns whether
    /// an owned row matched. Must not touch any other column.
    async fn set_ai_suggestions(
        &self,
        id: Uuid,
        user_id: Uuid,
        suggestions: &AiSuggestions,
    ) -> Result<bool, StoreError>;

    /// Single conditional write of the generated cover letter.
    async fn set_cover_letter(
        &self,
        id: Uuid,
        user_id: Uuid,
        cover_letter: &str,
    ) -> Result<bool, StoreError>;

    async fn find_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Applications still waiting on the given statuses, applied on or
    /// before `applied_before`, with no follow-up recorded yet.
    async fn find_stale_unnotified(
        &self,
        statuses: &[ApplicationStatus],
        applied_before: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError>;

    /// Conditional on `follow_up_sent = false`, so a concurrent or repeated
    /// sweep marks each application at most once.
    async fn mark_follow_up_sent(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, row: ApplicationRow) -> Result<ApplicationRow, StoreError> {
        let inserted = sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications
                (id, user_id, company, position, job_description, job_url, platform,
                 location, salary_range, status, applied_date, last_updated, timeline,
                 notes, resume_used, cover_letter, ai_suggestions, follow_up_sent,
                 follow_up_date, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(row.user_id)
        .bind(row.company)
        .bind(row.position)
        .bind(row.job_description)
        .bind(row.job_url)
        .bind(row.platform)
        .bind(row.location)
        .bind(row.salary_range)
        .bind(row.status)
        .bind(row.applied_date)
        .bind(row.last_updated)
        .bind(row.timeline)
        .bind(row.notes)
        .bind(row.resume_used)
        .bind(row.cover_letter)
        .bind(row.ai_suggestions)
        .bind(row.follow_up_sent)
        .bind(row.follow_up_date)
        .bind(row.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filters: &ApplicationFilters,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let mut sql = String::from("SELECT * FROM applications WHERE user_id = $1");
        let mut idx = 2;
        if filters.status.is_some() {
            sql.push_str(&format!(" AND status = ${idx}"));
            idx += 1;
        }
        if filters.platform.is_some() {
            sql.push_str(&format!(" AND platform = ${idx}"));
            idx += 1;
        }
        if filters.company.is_some() {
            sql.push_str(&format!(" AND company = ${idx}"));
        }
        sql.push_str(ApplicationSort::parse(filters.sort_by.as_deref()).order_clause());

        let mut query = sqlx::query_as::<_, ApplicationRow>(&sql).bind(user_id);
        if let Some(status) = &filters.status {
            query = query.bind(status.clone());
        }
        if let Some(platform) = &filters.platform {
            query = query.bind(platform.clone());
        }
        if let Some(company) = &filters.company {
            query = query.bind(company.clone());
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_details(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateApplicationInput,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications SET
                company = COALESCE($3, company),
                position = COALESCE($4, position),
                job_description = COALESCE($5, job_description),
                job_url = COALESCE($6, job_url),
                platform = COALESCE($7, platform),
                location = COALESCE($8, location),
                salary_range = COALESCE($9, salary_range),
                notes = COALESCE($10, notes),
                resume_used = COALESCE($11, resume_used)
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(changes.company.clone())
        .bind(changes.position.clone())
        .bind(changes.job_description.clone())
        .bind(changes.job_url.clone())
        .bind(changes.platform.clone())
        .bind(changes.location.clone())
        .bind(changes.salary_range.clone().map(Json))
        .bind(changes.notes.clone())
        .bind(changes.resume_used)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
        entry: TimelineEntry,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            UPDATE applications
            SET status = $3, last_updated = $4, timeline = timeline || $5
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(status.as_str())
        .bind(entry.date)
        .bind(Json(vec![entry]))
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_ai_suggestions(
        &self,
        id: Uuid,
        user_id: Uuid,
        suggestions: &AiSuggestions,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE applications SET ai_suggestions = $3 WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .bind(Json(suggestions.clone()))
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_cover_letter(
        &self,
        id: Uuid,
        user_id: Uuid,
        cover_letter: &str,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE applications SET cover_letter = $3 WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .bind(cover_letter)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications
             WHERE user_id = $1 AND applied_date >= $2
             ORDER BY applied_date ASC",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn find_stale_unnotified(
        &self,
        statuses: &[ApplicationStatus],
        applied_before: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let status_strings: Vec<String> =
            statuses.iter().map(|s| s.as_str().to_string()).collect();
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications
             WHERE status = ANY($1) AND follow_up_sent = FALSE AND applied_date <= $2
             ORDER BY applied_date ASC",
        )
        .bind(status_strings)
        .bind(applied_before)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn mark_follow_up_sent(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE applications
             SET follow_up_sent = TRUE, follow_up_date = $2
             WHERE id = $1 AND follow_up_sent = FALSE",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory implementation (tests / local dev)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryApplicationStore {
    rows: RwLock<HashMap<Uuid, ApplicationRow>>,
}

impl InMemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn insert(&self, row: ApplicationRow) -> Result<ApplicationRow, StoreError> {
        let mut rows = self.rows.write().unwrap();
        rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        user_id: Uuid,
        filters: &ApplicationFilters,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .filter(|r| filters.status.as_ref().map_or(true, |s| &r.status == s))
            .filter(|r| filters.platform.as_ref().map_or(true, |p| &r.platform == p))
            .filter(|r| filters.company.as_ref().map_or(true, |c| &r.company == c))
            .cloned()
            .collect();
        match ApplicationSort::parse(filters.sort_by.as_deref()) {
            ApplicationSort::AppliedDateAsc => result.sort_by_key(|r| r.applied_date),
            ApplicationSort::AppliedDateDesc => {
                result.sort_by_key(|r| std::cmp::Reverse(r.applied_date))
            }
            ApplicationSort::LastUpdatedAsc => result.sort_by_key(|r| r.last_updated),
            ApplicationSort::LastUpdatedDesc => {
                result.sort_by_key(|r| std::cmp::Reverse(r.last_updated))
            }
        }
        Ok(result)
    }

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.get(&id).filter(|r| r.user_id == user_id).cloned())
    }

    async fn update_details(
        &self,
        id: Uuid,
        user_id: Uuid,
        changes: &UpdateApplicationInput,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        let mut rows = self.rows.write().unwrap();
        let Some(row) = rows.get_mut(&id).filter(|r| r.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(company) = &changes.company {
            row.company = company.clone();
        }
        if let Some(position) = &changes.position {
            row.position = position.clone();
        }
        if let Some(jd) = &changes.job_description {
            row.job_description = Some(jd.clone());
        }
        if let Some(url) = &changes.job_url {
            row.job_url = Some(url.clone());
        }
        if let Some(platform) = &changes.platform {
            row.platform = platform.clone();
        }
        if let Some(location) = &changes.location {
            row.location = Some(location.clone());
        }
        if let Some(range) = &changes.salary_range {
            row.salary_range = Some(Json(range.clone()));
        }
        if let Some(notes) = &changes.notes {
            row.notes = Some(notes.clone());
        }
        if let Some(resume) = changes.resume_used {
            row.resume_used = Some(resume);
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get(&id) {
            Some(r) if r.user_id == user_id => {
                rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        user_id: Uuid,
        status: ApplicationStatus,
        entry: TimelineEntry,
    ) -> Result<Option<ApplicationRow>, StoreError> {
        let mut rows = self.rows.write().unwrap();
        let Some(row) = rows.get_mut(&id).filter(|r| r.user_id == user_id) else {
            return Ok(None);
        };
        row.status = status.as_str().to_string();
        row.last_updated = entry.date;
        row.timeline.0.push(entry);
        Ok(Some(row.clone()))
    }

    async fn set_ai_suggestions(
        &self,
        id: Uuid,
        user_id: Uuid,
        suggestions: &AiSuggestions,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&id).filter(|r| r.user_id == user_id) {
            Some(row) => {
                row.ai_suggestions = Some(Json(suggestions.clone()));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_cover_letter(
        &self,
        id: Uuid,
        user_id: Uuid,
        cover_letter: &str,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&id).filter(|r| r.user_id == user_id) {
            Some(row) => {
                row.cover_letter = Some(cover_letter.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id && r.applied_date >= since)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.applied_date);
        Ok(result)
    }

    async fn find_stale_unnotified(
        &self,
        statuses: &[ApplicationStatus],
        applied_before: DateTime<Utc>,
    ) -> Result<Vec<ApplicationRow>, StoreError> {
        let wanted: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let rows = self.rows.read().unwrap();
        let mut result: Vec<_> = rows
            .values()
            .filter(|r| {
                wanted.contains(&r.status.as_str())
                    && !r.follow_up_sent
                    && r.applied_date <= applied_before
            })
            .cloned()
            .collect();
        result.sort_by_key(|r| r.applied_date);
        Ok(result)
    }

    async fn mark_follow_up_sent(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&id).filter(|r| !r.follow_up_sent) {
            Some(row) => {
                row.follow_up_sent = true;
                row.follow_up_date = Some(now);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::SalaryRange;

    fn sample_row(user_id: Uuid) -> ApplicationRow {
        let now = Utc::now();
        ApplicationRow {
            id: Uuid::new_v4(),
            user_id,
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            job_description: None,
            job_url: None,
            platform: "Direct".to_string(),
            location: None,
            salary_range: None,
            status: "applied".to_string(),
            applied_date: now,
            last_updated: now,
            timeline: Json(vec![TimelineEntry {
                status: "applied".to_string(),
                date: now,
                notes: None,
            }]),
            notes: None,
            resume_used: None,
            cover_letter: None,
            ai_suggestions: None,
            follow_up_sent: false,
            follow_up_date: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn find_owned_hides_other_users_rows() {
        let store = InMemoryApplicationStore::new();
        let owner = Uuid::new_v4();
        let row = store.insert(sample_row(owner)).await.unwrap();

        assert!(store.find_owned(row.id, owner).await.unwrap().is_some());
        assert!(store
            .find_owned(row.id, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn update_status_appends_one_timeline_entry() {
        let store = InMemoryApplicationStore::new();
        let owner = Uuid::new_v4();
        let row = store.insert(sample_row(owner)).await.unwrap();
        let now = Utc::now();

        let updated = store
            .update_status(
                row.id,
                owner,
                ApplicationStatus::Interview,
                TimelineEntry {
                    status: "interview".to_string(),
                    date: now,
                    notes: Some("Status changed to interview".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, "interview");
        assert_eq!(updated.last_updated, now);
        assert_eq!(updated.timeline.0.len(), 2);
    }

    #[tokio::test]
    async fn conditional_writes_miss_unowned_rows() {
        let store = InMemoryApplicationStore::new();
        let owner = Uuid::new_v4();
        let row = store.insert(sample_row(owner)).await.unwrap();

        let stranger = Uuid::new_v4();
        assert!(!store
            .set_cover_letter(row.id, stranger, "Dear team")
            .await
            .unwrap());
        let unchanged = store.find_owned(row.id, owner).await.unwrap().unwrap();
        assert!(unchanged.cover_letter.is_none());
    }

    #[tokio::test]
    async fn mark_follow_up_sent_is_one_shot() {
        let store = InMemoryApplicationStore::new();
        let row = store.insert(sample_row(Uuid::new_v4())).await.unwrap();
        let now = Utc::now();

        assert!(store.mark_follow_up_sent(row.id, now).await.unwrap());
        assert!(!store.mark_follow_up_sent(row.id, now).await.unwrap());
    }

    #[tokio::test]
    async fn update_details_leaves_status_and_timeline_alone() {
        let store = InMemoryApplicationStore::new();
        let owner = Uuid::new_v4();
        let row = store.insert(sample_row(owner)).await.unwrap();

        let changes = UpdateApplicationInput {
            company: Some("Globex".to_string()),
            salary_range: Some(SalaryRange {
                min: Some(100_000),
                max: Some(140_000),
                currency: Some("USD".to_string()),
            }),
            ..Default::default()
        };
        let updated = store
            .update_details(row.id, owner, &changes)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.company, "Globex");
        assert_eq!(updated.status, row.status);
        assert_eq!(updated.timeline.0.len(), row.timeline.0.len());
        assert_eq!(updated.last_updated, row.last_updated);
    }
}
