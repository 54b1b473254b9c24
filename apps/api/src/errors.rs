use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Referenced record exists but belongs to another user. Surfaced to the
    /// caller as not-found so ownership checks never leak existence.
    #[error("Not owned: {0}")]
    Ownership(String),

    #[error("AI returned malformed output: {0}")]
    MalformedResponse(String),

    #[error("AI returned no content")]
    EmptyResponse,

    #[error("AI rate limited: {0}")]
    RateLimited(String),

    #[error("AI authentication failed: {0}")]
    AiAuth(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(e) => AppError::Database(e),
            StoreError::Encoding(e) => AppError::Internal(e.into()),
            StoreError::Corrupt(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::RateLimited { .. } => AppError::RateLimited(err.to_string()),
            LlmError::Auth { .. } => AppError::AiAuth(err.to_string()),
            LlmError::EmptyContent => AppError::EmptyResponse,
            LlmError::Parse(e) => AppError::MalformedResponse(e.to_string()),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Ownership(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed AI response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_MALFORMED_RESPONSE",
                    "The AI service returned an unusable response".to_string(),
                )
            }
            AppError::EmptyResponse => (
                StatusCode::BAD_GATEWAY,
                "AI_EMPTY_RESPONSE",
                "The AI service returned no content".to_string(),
            ),
            AppError::RateLimited(msg) => {
                tracing::warn!("AI rate limited: {msg}");
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "AI service is rate limited, try again later".to_string(),
                )
            }
            AppError::AiAuth(msg) => {
                tracing::error!("AI auth failure: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "AI_AUTH_ERROR",
                    "AI service credentials were rejected".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
