//! Durable record stores behind trait seams.
//!
//! Each store ships a Postgres implementation for production and an
//! in-memory implementation for tests and local development. Everything the
//! job pipeline writes goes through single conditional statements keyed on
//! `(id, user_id)` so concurrent writers can never interleave partial state.

pub mod applications;
pub mod notifications;
pub mod resumes;
pub mod stats;

pub use applications::ApplicationStore;
pub use notifications::NotificationStore;
pub use resumes::ResumeStore;
pub use stats::StatsStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}
