//! Axum route handlers for the Applications API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::service;
use crate::analytics;
use crate::errors::AppError;
use crate::models::application::{
    ApplicationFilters, ApplicationRow, CreateApplicationInput, UpdateApplicationInput,
};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ListApplicationsQuery {
    pub user_id: Uuid,
    pub status: Option<String>,
    pub platform: Option<String>,
    pub company: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateApplicationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: CreateApplicationInput,
}

#[derive(Deserialize)]
pub struct UpdateApplicationRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateApplicationInput,
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    pub user_id: Uuid,
    pub status: String,
}

/// POST /api/v1/applications
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    let row =
        service::create_application(state.applications.as_ref(), req.user_id, req.input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    let filters = ApplicationFilters {
        status: query.status,
        platform: query.platform,
        company: query.company,
        sort_by: query.sort_by,
    };
    let rows =
        service::get_user_applications(state.applications.as_ref(), query.user_id, &filters)
            .await?;
    Ok(Json(rows))
}

/// GET /api/v1/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ApplicationRow>, AppError> {
    let row = service::get_application(state.applications.as_ref(), params.user_id, id).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/applications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplicationRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let row =
        service::update_application(state.applications.as_ref(), req.user_id, id, &req.changes)
            .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<StatusCode, AppError> {
    service::delete_application(state.applications.as_ref(), params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/applications/:id/status
///
/// On success the user's monthly stats are recomputed best-effort — a
/// failed refresh never fails the status change itself.
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let row =
        service::update_status(state.applications.as_ref(), req.user_id, id, &req.status).await?;

    if let Err(e) = analytics::service::update_monthly_stats(
        state.applications.as_ref(),
        state.stats.as_ref(),
        req.user_id,
    )
    .await
    {
        tracing::warn!(user_id = %req.user_id, "monthly stats refresh failed: {e}");
    }

    Ok(Json(row))
}
