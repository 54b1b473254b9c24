use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::jobs::queue::TaskQueue;
use crate::llm_client::TextGenerator;
use crate::store::{ApplicationStore, NotificationStore, ResumeStore, StatsStore};

/// Shared application state injected into all route handlers via Axum
/// extractors. Stores and the queue sit behind trait objects so workers and
/// tests wire in the same seams.
#[derive(Clone)]
pub struct AppState {
    /// Raw pool, kept for ad-hoc queries outside the store seams.
    #[allow(dead_code)]
    pub db: PgPool,
    #[allow(dead_code)]
    pub config: Config,
    /// Workers hold their own handle via `JobContext`; route handlers never
    /// call the collaborator directly.
    #[allow(dead_code)]
    pub llm: Arc<dyn TextGenerator>,
    pub queue: Arc<dyn TaskQueue>,
    pub applications: Arc<dyn ApplicationStore>,
    pub resumes: Arc<dyn ResumeStore>,
    pub stats: Arc<dyn StatsStore>,
    pub notifications: Arc<dyn NotificationStore>,
}
