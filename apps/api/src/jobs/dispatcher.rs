//! Worker dispatcher — claims tasks and drives them to a terminal state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::handlers;
use super::queue::TaskQueue;
use super::reconciler;
use super::types::{AnalyzeResumePayload, GenerateCoverLetterPayload, Task, TaskType};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::store::{ApplicationStore, ResumeStore};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Everything a worker needs to execute tasks. Cheap to clone; multiple
/// dispatchers may share one context and rely on the queue's claim
/// atomicity for exclusivity.
#[derive(Clone)]
pub struct JobContext {
    pub queue: Arc<dyn TaskQueue>,
    pub applications: Arc<dyn ApplicationStore>,
    pub resumes: Arc<dyn ResumeStore>,
    pub llm: Arc<dyn TextGenerator>,
}

pub struct Dispatcher {
    ctx: JobContext,
    poll_interval: Duration,
}

impl Dispatcher {
    pub fn new(ctx: JobContext) -> Self {
        Self {
            ctx,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Runs until the shutdown signal flips. Claim → execute → mark; idle
    /// polls sleep for `poll_interval`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!("AI worker started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            match self.ctx.queue.claim(None).await {
                Ok(Some(task)) => {
                    let task_id = task.id;
                    if let Err(e) = self.execute(task).await {
                        debug!(job_id = %task_id, error = %e, "task execution failed");
                    }
                }
                Ok(None) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.poll_interval) => {}
                        _ = shutdown.changed() => {}
                    }
                }
                Err(e) => {
                    error!("failed to claim task: {e}");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }
        info!("AI worker stopped");
    }

    /// Executes one claimed task to a terminal state. Public so tests can
    /// drive a task synchronously without the polling loop.
    ///
    /// Success stores the handler result on the task for the caller to
    /// poll. Any error marks the task failed with the message recorded —
    /// no automatic retry; re-queueing is an explicit operator action.
    pub async fn execute(&self, task: Task) -> Result<(), AppError> {
        match self.run_handler(&task).await {
            Ok(result) => {
                self.ctx.queue.complete(task.id, Some(result)).await?;
                info!(job_id = %task.id, task_type = task.task_type.as_str(), "task completed");
                Ok(())
            }
            Err(err) => {
                self.ctx.queue.fail(task.id, &err.to_string()).await?;
                warn!(job_id = %task.id, error = %err, "task failed");
                Err(err)
            }
        }
    }

    async fn run_handler(&self, task: &Task) -> Result<serde_json::Value, AppError> {
        match task.task_type {
            TaskType::AnalyzeResume => {
                let payload: AnalyzeResumePayload = serde_json::from_value(task.payload.clone())
                    .map_err(|e| AppError::Validation(format!("invalid task payload: {e}")))?;
                let analysis = handlers::analyze_resume(
                    self.ctx.resumes.as_ref(),
                    self.ctx.llm.as_ref(),
                    &payload,
                )
                .await?;
                reconciler::apply_analysis(
                    self.ctx.applications.as_ref(),
                    payload.application_id,
                    payload.user_id,
                    &analysis,
                    Utc::now(),
                )
                .await?;
                Ok(serde_json::to_value(&analysis).map_err(anyhow::Error::from)?)
            }
            TaskType::GenerateCoverLetter => {
                let payload: GenerateCoverLetterPayload =
                    serde_json::from_value(task.payload.clone())
                        .map_err(|e| AppError::Validation(format!("invalid task payload: {e}")))?;
                let letter =
                    handlers::generate_cover_letter(self.ctx.llm.as_ref(), &payload).await?;
                reconciler::apply_cover_letter(
                    self.ctx.applications.as_ref(),
                    payload.application_id,
                    payload.user_id,
                    &letter,
                )
                .await?;
                Ok(serde_json::json!({ "coverLetter": letter }))
            }
        }
    }
}
