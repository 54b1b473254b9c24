//! Resume record operations. File upload and text extraction happen
//! upstream; this service owns the durable rows the analysis pipeline reads.

use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{CreateResumeInput, ResumeRow};
use crate::store::ResumeStore;

const NOT_OWNED: &str = "Resume not found or not owned by user";

pub async fn create_resume(
    store: &dyn ResumeStore,
    user_id: Uuid,
    input: CreateResumeInput,
) -> Result<ResumeRow, AppError> {
    if input.file_name.trim().is_empty() {
        return Err(AppError::Validation("file_name is required".to_string()));
    }
    let row = ResumeRow {
        id: Uuid::new_v4(),
        user_id,
        file_name: input.file_name.trim().to_string(),
        file_url: input.file_url,
        extracted_text: input.extracted_text,
        version: input.version.unwrap_or_else(|| "v1".to_string()),
        uploaded_at: Utc::now(),
        is_default: false,
    };
    Ok(store.insert(row).await?)
}

pub async fn get_user_resumes(
    store: &dyn ResumeStore,
    user_id: Uuid,
) -> Result<Vec<ResumeRow>, AppError> {
    Ok(store.list(user_id).await?)
}

pub async fn get_resume(
    store: &dyn ResumeStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<ResumeRow, AppError> {
    store
        .find_owned(id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_OWNED.to_string()))
}

/// Makes the resume the user's only default. Unsetting every sibling and
/// setting the target happen in one transaction, so the at-most-one-default
/// invariant holds under concurrent calls.
pub async fn set_default_resume(
    store: &dyn ResumeStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    if !store.set_default(id, user_id).await? {
        return Err(AppError::NotFound(NOT_OWNED.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::resumes::InMemoryResumeStore;

    fn input(name: &str) -> CreateResumeInput {
        CreateResumeInput {
            file_name: name.to_string(),
            file_url: None,
            extracted_text: Some("Engineer with queue experience".to_string()),
            version: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_version_and_not_default() {
        let store = InMemoryResumeStore::new();
        let row = create_resume(&store, Uuid::new_v4(), input("cv.pdf"))
            .await
            .unwrap();
        assert_eq!(row.version, "v1");
        assert!(!row.is_default);
    }

    #[tokio::test]
    async fn create_requires_file_name() {
        let store = InMemoryResumeStore::new();
        let err = create_resume(&store, Uuid::new_v4(), input("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn set_default_keeps_exactly_one_default() {
        let store = InMemoryResumeStore::new();
        let user_id = Uuid::new_v4();
        let first = create_resume(&store, user_id, input("a.pdf")).await.unwrap();
        let second = create_resume(&store, user_id, input("b.pdf")).await.unwrap();

        set_default_resume(&store, user_id, first.id).await.unwrap();
        set_default_resume(&store, user_id, second.id).await.unwrap();

        let rows = get_user_resumes(&store, user_id).await.unwrap();
        let defaults: Vec<_> = rows.iter().filter(|r| r.is_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, second.id);
    }

    #[tokio::test]
    async fn set_default_on_unowned_resume_is_not_found() {
        let store = InMemoryResumeStore::new();
        let owner = Uuid::new_v4();
        let row = create_resume(&store, owner, input("cv.pdf")).await.unwrap();

        let err = set_default_resume(&store, Uuid::new_v4(), row.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
