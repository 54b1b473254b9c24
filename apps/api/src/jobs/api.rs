//! Enqueue surface of the job pipeline: validate, persist, acknowledge.
//!
//! Validation runs before anything touches the queue — an invalid payload
//! never produces a job handle. The Axum handlers below are thin wrappers
//! over the enqueue functions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::queue::TaskQueue;
use super::types::{
    AnalyzeResumePayload, GenerateCoverLetterPayload, TaskCounts, TaskId, TaskStatus, TaskType,
};
use crate::errors::AppError;
use crate::state::AppState;

pub async fn enqueue_analyze_resume(
    queue: &dyn TaskQueue,
    payload: AnalyzeResumePayload,
) -> Result<TaskId, AppError> {
    payload.validate()?;
    let value = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    Ok(queue.enqueue(TaskType::AnalyzeResume, value).await?)
}

pub async fn enqueue_cover_letter(
    queue: &dyn TaskQueue,
    payload: GenerateCoverLetterPayload,
) -> Result<TaskId, AppError> {
    payload.validate()?;
    let value = serde_json::to_value(&payload).map_err(anyhow::Error::from)?;
    Ok(queue.enqueue(TaskType::GenerateCoverLetter, value).await?)
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub job_id: TaskId,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: TaskId,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// POST /api/v1/ai/analyze-resume
///
/// Acknowledges immediately; the caller polls the returned job id.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Json(payload): Json<AnalyzeResumePayload>,
) -> Result<(StatusCode, Json<EnqueueResponse>), AppError> {
    let job_id = enqueue_analyze_resume(state.queue.as_ref(), payload).await?;
    Ok((StatusCode::ACCEPTED, Json(EnqueueResponse { job_id })))
}

/// POST /api/v1/ai/cover-letter
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(payload): Json<GenerateCoverLetterPayload>,
) -> Result<(StatusCode, Json<EnqueueResponse>), AppError> {
    let job_id = enqueue_cover_letter(state.queue.as_ref(), payload).await?;
    Ok((StatusCode::ACCEPTED, Json(EnqueueResponse { job_id })))
}

/// GET /api/v1/ai/jobs/:id
///
/// A failed task surfaces its recorded error message here.
pub async fn handle_job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, AppError> {
    let task = state
        .queue
        .get(TaskId(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(JobStatusResponse {
        job_id: task.id,
        status: task.status,
        result: task.result,
        error: task.error,
        enqueued_at: task.enqueued_at,
        updated_at: task.updated_at,
    }))
}

/// POST /api/v1/ai/jobs/:id/retry
///
/// Explicit operational re-queue of a failed task.
pub async fn handle_retry_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let retried = state.queue.retry(TaskId(id)).await?;
    if !retried {
        return Err(AppError::NotFound(format!(
            "Job {id} not found or not in a failed state"
        )));
    }
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/ai/queue/stats
pub async fn handle_queue_stats(
    State(state): State<AppState>,
) -> Result<Json<TaskCounts>, AppError> {
    Ok(Json(state.queue.counts().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::queue::InMemoryTaskQueue;

    #[tokio::test]
    async fn invalid_payload_never_reaches_the_queue() {
        let queue = InMemoryTaskQueue::new();
        let payload = AnalyzeResumePayload {
            resume_id: None,
            resume_text: Some("Rust engineer".to_string()),
            job_description: "  ".to_string(),
            application_id: None,
            user_id: Uuid::new_v4(),
        };

        let err = enqueue_analyze_resume(&queue, payload).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(queue.counts().await.unwrap(), TaskCounts::default());
    }

    #[tokio::test]
    async fn valid_payload_produces_a_pollable_handle() {
        let queue = InMemoryTaskQueue::new();
        let payload = GenerateCoverLetterPayload {
            position: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            resume_summary: "Ten years of Rust".to_string(),
            job_description: "Build backend services".to_string(),
            application_id: None,
            user_id: Uuid::new_v4(),
        };

        let id = enqueue_cover_letter(&queue, payload).await.unwrap();
        let task = queue.get(id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.task_type, TaskType::GenerateCoverLetter);
    }
}
