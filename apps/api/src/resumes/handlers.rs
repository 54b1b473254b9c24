//! Axum route handlers for the Resumes API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::service;
use crate::errors::AppError;
use crate::models::resume::{CreateResumeInput, ResumeRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateResumeRequest {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub input: CreateResumeInput,
}

#[derive(Deserialize)]
pub struct SetDefaultRequest {
    pub user_id: Uuid,
}

/// POST /api/v1/resumes
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateResumeRequest>,
) -> Result<(StatusCode, Json<ResumeRow>), AppError> {
    let row = service::create_resume(state.resumes.as_ref(), req.user_id, req.input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ResumeRow>>, AppError> {
    let rows = service::get_user_resumes(state.resumes.as_ref(), params.user_id).await?;
    Ok(Json(rows))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ResumeRow>, AppError> {
    let row = service::get_resume(state.resumes.as_ref(), params.user_id, id).await?;
    Ok(Json(row))
}

/// PATCH /api/v1/resumes/:id/default
pub async fn handle_set_default(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetDefaultRequest>,
) -> Result<StatusCode, AppError> {
    service::set_default_resume(state.resumes.as_ref(), req.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
