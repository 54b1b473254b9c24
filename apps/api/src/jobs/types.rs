#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Unique task identifier — the job handle the enqueueing caller polls with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Task kind for routing to the matching handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    AnalyzeResume,
    GenerateCoverLetter,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::AnalyzeResume => "analyze_resume",
            TaskType::GenerateCoverLetter => "generate_cover_letter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "analyze_resume" => Some(TaskType::AnalyzeResume),
            "generate_cover_letter" => Some(TaskType::GenerateCoverLetter),
            _ => None,
        }
    }
}

/// Task execution status, tracked as a durable column rather than broker
/// state. `claimed` rows belong to exactly one in-flight worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Claimed,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Claimed => "claimed",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TaskStatus::Pending),
            "claimed" => Some(TaskStatus::Claimed),
            "done" => Some(TaskStatus::Done),
            "failed" => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// A unit of deferred AI work. The payload is immutable once enqueued;
/// `result`/`error` are filled in at terminal states for the caller to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub task_type: TaskType,
    pub payload: serde_json::Value,
    pub status: TaskStatus,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub enqueued_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-status queue gauges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub pending: i64,
    pub claimed: i64,
    pub done: i64,
    pub failed: i64,
}

/// Payload for resume-to-job-description analysis. Either direct text or a
/// stored resume reference; direct text wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResumePayload {
    pub resume_id: Option<Uuid>,
    pub resume_text: Option<String>,
    pub job_description: String,
    pub application_id: Option<Uuid>,
    pub user_id: Uuid,
}

impl AnalyzeResumePayload {
    /// Caller-side validation — runs before the task is persisted, so an
    /// invalid payload never produces a job handle.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description is required".to_string(),
            ));
        }
        let has_text = self
            .resume_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false);
        if !has_text && self.resume_id.is_none() {
            return Err(AppError::Validation(
                "resume_text or resume_id is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Payload for cover-letter generation. All four fields required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCoverLetterPayload {
    pub position: String,
    pub company: String,
    pub resume_summary: String,
    pub job_description: String,
    pub application_id: Option<Uuid>,
    pub user_id: Uuid,
}

impl GenerateCoverLetterPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        let required = [
            ("position", &self.position),
            ("company", &self.company),
            ("resume_summary", &self.resume_summary),
            ("job_description", &self.job_description),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_payload() -> AnalyzeResumePayload {
        AnalyzeResumePayload {
            resume_id: None,
            resume_text: Some("Senior engineer, ten years of Rust".to_string()),
            job_description: "Build backend services".to_string(),
            application_id: None,
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn analyze_payload_rejects_empty_job_description() {
        let payload = AnalyzeResumePayload {
            job_description: "   ".to_string(),
            ..analyze_payload()
        };
        assert!(matches!(
            payload.validate(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn analyze_payload_requires_text_or_resume_reference() {
        let payload = AnalyzeResumePayload {
            resume_text: Some("  ".to_string()),
            resume_id: None,
            ..analyze_payload()
        };
        assert!(payload.validate().is_err());

        let payload = AnalyzeResumePayload {
            resume_text: None,
            resume_id: Some(Uuid::new_v4()),
            ..analyze_payload()
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn cover_letter_payload_requires_all_four_fields() {
        let payload = GenerateCoverLetterPayload {
            position: "Backend Engineer".to_string(),
            company: "Acme".to_string(),
            resume_summary: "Ten years of Rust".to_string(),
            job_description: "Build backend services".to_string(),
            application_id: None,
            user_id: Uuid::new_v4(),
        };
        assert!(payload.validate().is_ok());

        let missing = GenerateCoverLetterPayload {
            company: "".to_string(),
            ..payload
        };
        assert!(matches!(
            missing.validate(),
            Err(AppError::Validation(msg)) if msg.contains("company")
        ));
    }

    #[test]
    fn task_type_round_trips() {
        for t in [TaskType::AnalyzeResume, TaskType::GenerateCoverLetter] {
            assert_eq!(TaskType::parse(t.as_str()), Some(t));
        }
        assert_eq!(TaskType::parse("mine_bitcoin"), None);
    }

    #[test]
    fn task_status_terminality() {
        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Claimed.is_terminal());
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());
    }
}
