//! Axum route handlers for the Analytics API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::service;
use crate::errors::AppError;
use crate::models::stats::MonthlyStatsRow;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub user_id: Uuid,
}

/// GET /api/v1/analytics/stats
pub async fn handle_get_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<MonthlyStatsRow>>, AppError> {
    let rows = service::get_user_stats(state.stats.as_ref(), params.user_id).await?;
    Ok(Json(rows))
}

/// POST /api/v1/analytics/refresh
///
/// Recomputes the current month on demand. Returns the fresh row, or null
/// when the user has no applications this month.
pub async fn handle_refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<Option<MonthlyStatsRow>>, AppError> {
    let row = service::update_monthly_stats(
        state.applications.as_ref(),
        state.stats.as_ref(),
        req.user_id,
    )
    .await?;
    Ok(Json(row))
}
