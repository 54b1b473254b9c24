//! Applies handler results onto durable application records.
//!
//! Every write here is a single conditional update keyed on
//! `(application_id, user_id)`. A missing or unowned record is a no-op —
//! the result still reaches the caller through the task's result field.
//! These writes never touch `status` or `timeline`.

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{AiSuggestions, AnalysisResult};
use crate::store::ApplicationStore;

pub async fn apply_analysis(
    applications: &dyn ApplicationStore,
    application_id: Option<Uuid>,
    user_id: Uuid,
    analysis: &AnalysisResult,
    generated_at: DateTime<Utc>,
) -> Result<(), AppError> {
    let Some(application_id) = application_id else {
        return Ok(());
    };
    let suggestions = AiSuggestions {
        analysis: analysis.clone(),
        generated_at,
    };
    let updated = applications
        .set_ai_suggestions(application_id, user_id, &suggestions)
        .await?;
    if !updated {
        debug!(%application_id, "no owned application matched; analysis not persisted");
    }
    Ok(())
}

pub async fn apply_cover_letter(
    applications: &dyn ApplicationStore,
    application_id: Option<Uuid>,
    user_id: Uuid,
    cover_letter: &str,
) -> Result<(), AppError> {
    let Some(application_id) = application_id else {
        return Ok(());
    };
    let updated = applications
        .set_cover_letter(application_id, user_id, cover_letter)
        .await?;
    if !updated {
        debug!(%application_id, "no owned application matched; cover letter not persisted");
    }
    Ok(())
}
