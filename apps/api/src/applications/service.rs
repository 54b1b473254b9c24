//! Application record operations, including the only status-transition path.

use std::str::FromStr;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{
    ApplicationFilters, ApplicationRow, ApplicationStatus, CreateApplicationInput, TimelineEntry,
    UpdateApplicationInput,
};
use crate::store::ApplicationStore;

const NOT_OWNED: &str = "Application not found or not owned by user";

pub async fn create_application(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    input: CreateApplicationInput,
) -> Result<ApplicationRow, AppError> {
    if input.company.trim().is_empty() {
        return Err(AppError::Validation("company is required".to_string()));
    }
    if input.position.trim().is_empty() {
        return Err(AppError::Validation("position is required".to_string()));
    }
    let status = match input.status.as_deref() {
        Some(raw) => ApplicationStatus::from_str(raw)
            .map_err(|_| AppError::Validation("Invalid status value".to_string()))?,
        None => ApplicationStatus::Applied,
    };

    let now = Utc::now();
    let row = ApplicationRow {
        id: Uuid::new_v4(),
        user_id,
        company: input.company.trim().to_string(),
        position: input.position.trim().to_string(),
        job_description: input.job_description,
        job_url: input.job_url,
        platform: input.platform.unwrap_or_else(|| "Direct".to_string()),
        location: input.location,
        salary_range: input.salary_range.map(Json),
        status: status.as_str().to_string(),
        applied_date: input.applied_date.unwrap_or(now),
        last_updated: now,
        // Creation seeds exactly one timeline entry.
        timeline: Json(vec![TimelineEntry {
            status: status.as_str().to_string(),
            date: now,
            notes: None,
        }]),
        notes: input.notes,
        resume_used: input.resume_used,
        cover_letter: None,
        ai_suggestions: None,
        follow_up_sent: false,
        follow_up_date: None,
        created_at: now,
    };
    Ok(store.insert(row).await?)
}

pub async fn get_user_applications(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    filters: &ApplicationFilters,
) -> Result<Vec<ApplicationRow>, AppError> {
    Ok(store.list(user_id, filters).await?)
}

pub async fn get_application(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<ApplicationRow, AppError> {
    store
        .find_owned(id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

pub async fn update_application(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    id: Uuid,
    changes: &UpdateApplicationInput,
) -> Result<ApplicationRow, AppError> {
    if changes.company.as_deref().is_some_and(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("company cannot be empty".to_string()));
    }
    if changes.position.as_deref().is_some_and(|p| p.trim().is_empty()) {
        return Err(AppError::Validation("position cannot be empty".to_string()));
    }
    store
        .update_details(id, user_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

pub async fn delete_application(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    if !store.delete(id, user_id).await? {
        return Err(AppError::NotFound(NOT_OWNED.to_string()));
    }
    Ok(())
}

/// The only path that grows the timeline besides creation: sets the status,
/// refreshes `last_updated`, and appends exactly one entry, atomically.
/// Repeated identical statuses are not deduplicated.
pub async fn update_status(
    store: &dyn ApplicationStore,
    user_id: Uuid,
    id: Uuid,
    raw_status: &str,
) -> Result<ApplicationRow, AppError> {
    let status = ApplicationStatus::from_str(raw_status)
        .map_err(|_| AppError::Validation("Invalid status value".to_string()))?;
    let now = Utc::now();
    let entry = TimelineEntry {
        status: status.as_str().to_string(),
        date: now,
        notes: Some(format!("Status changed to {status}")),
    };
    store
        .update_status(id, user_id, status, entry)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::applications::InMemoryApplicationStore;

    fn create_input() -> CreateApplicationInput {
        CreateApplicationInput {
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            job_description: None,
            job_url: None,
            platform: None,
            location: None,
            salary_range: None,
            status: None,
            applied_date: None,
            notes: None,
            resume_used: None,
        }
    }

    #[tokio::test]
    async fn create_seeds_exactly_one_timeline_entry() {
        let store = InMemoryApplicationStore::new();
        let row = create_application(&store, Uuid::new_v4(), create_input())
            .await
            .unwrap();

        assert_eq!(row.status, "applied");
        assert_eq!(row.platform, "Direct");
        assert_eq!(row.timeline.0.len(), 1);
        assert_eq!(row.timeline.0[0].status, "applied");
    }

    #[tokio::test]
    async fn create_rejects_unknown_status() {
        let store = InMemoryApplicationStore::new();
        let input = CreateApplicationInput {
            status: Some("ghosted".to_string()),
            ..create_input()
        };
        let err = create_application(&store, Uuid::new_v4(), input)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_status_appends_one_entry_per_call() {
        let store = InMemoryApplicationStore::new();
        let user_id = Uuid::new_v4();
        let row = create_application(&store, user_id, create_input())
            .await
            .unwrap();

        let first = update_status(&store, user_id, row.id, "interview")
            .await
            .unwrap();
        assert_eq!(first.status, "interview");
        assert_eq!(first.timeline.0.len(), 2);
        assert_eq!(
            first.timeline.0[1].notes.as_deref(),
            Some("Status changed to interview")
        );

        // Same status again: not deduplicated, timeline grows by exactly 1,
        // status and last_updated reflect the latest call.
        let second = update_status(&store, user_id, row.id, "interview")
            .await
            .unwrap();
        assert_eq!(second.status, "interview");
        assert_eq!(second.timeline.0.len(), 3);
        assert!(second.last_updated >= first.last_updated);
    }

    #[tokio::test]
    async fn update_status_rejects_values_outside_enum() {
        let store = InMemoryApplicationStore::new();
        let user_id = Uuid::new_v4();
        let row = create_application(&store, user_id, create_input())
            .await
            .unwrap();

        let err = update_status(&store, user_id, row.id, "withdrawn")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Nothing was appended by the rejected call.
        let unchanged = get_application(&store, user_id, row.id).await.unwrap();
        assert_eq!(unchanged.timeline.0.len(), 1);
    }

    #[tokio::test]
    async fn update_status_on_unowned_application_is_not_found() {
        let store = InMemoryApplicationStore::new();
        let owner = Uuid::new_v4();
        let row = create_application(&store, owner, create_input())
            .await
            .unwrap();

        let err = update_status(&store, Uuid::new_v4(), row.id, "offer")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_missing_application_is_not_found() {
        let store = InMemoryApplicationStore::new();
        let err = delete_application(&store, Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
