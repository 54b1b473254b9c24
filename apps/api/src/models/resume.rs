#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stored resume. Upload and text extraction happen upstream; this row
/// carries whatever text the extraction step produced.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    pub file_url: Option<String>,
    pub extracted_text: Option<String>,
    pub version: String,
    pub uploaded_at: DateTime<Utc>,
    pub is_default: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateResumeInput {
    pub file_name: String,
    pub file_url: Option<String>,
    pub extracted_text: Option<String>,
    pub version: Option<String>,
}
