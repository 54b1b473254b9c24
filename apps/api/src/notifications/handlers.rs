//! Axum route handlers for the Notifications API.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::service;
use crate::errors::AppError;
use crate::models::notification::NotificationRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct SweepResponse {
    pub processed: usize,
}

/// GET /api/v1/notifications
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<NotificationRow>>, AppError> {
    let rows =
        service::get_user_notifications(state.notifications.as_ref(), params.user_id).await?;
    Ok(Json(rows))
}

/// POST /api/v1/notifications/run-follow-ups
///
/// On-demand trigger for the daily sweep — same idempotent pass.
pub async fn handle_run_follow_ups(
    State(state): State<AppState>,
) -> Result<Json<SweepResponse>, AppError> {
    let processed = service::run_follow_up_sweep(
        state.applications.as_ref(),
        state.notifications.as_ref(),
        Utc::now(),
    )
    .await?;
    Ok(Json(SweepResponse { processed }))
}
