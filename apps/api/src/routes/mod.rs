pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::analytics;
use crate::applications;
use crate::jobs;
use crate::notifications;
use crate::resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Applications API
        .route(
            "/api/v1/applications",
            post(applications::handlers::handle_create).get(applications::handlers::handle_list),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handlers::handle_get)
                .patch(applications::handlers::handle_update)
                .delete(applications::handlers::handle_delete),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handlers::handle_update_status),
        )
        // AI job pipeline
        .route(
            "/api/v1/ai/analyze-resume",
            post(jobs::api::handle_analyze_resume),
        )
        .route(
            "/api/v1/ai/cover-letter",
            post(jobs::api::handle_generate_cover_letter),
        )
        .route("/api/v1/ai/jobs/:id", get(jobs::api::handle_job_status))
        .route(
            "/api/v1/ai/jobs/:id/retry",
            post(jobs::api::handle_retry_job),
        )
        .route("/api/v1/ai/queue/stats", get(jobs::api::handle_queue_stats))
        // Analytics API
        .route(
            "/api/v1/analytics/stats",
            get(analytics::handlers::handle_get_stats),
        )
        .route(
            "/api/v1/analytics/refresh",
            post(analytics::handlers::handle_refresh),
        )
        // Resumes API
        .route(
            "/api/v1/resumes",
            post(resumes::handlers::handle_create).get(resumes::handlers::handle_list),
        )
        .route("/api/v1/resumes/:id", get(resumes::handlers::handle_get))
        .route(
            "/api/v1/resumes/:id/default",
            patch(resumes::handlers::handle_set_default),
        )
        // Notifications API
        .route(
            "/api/v1/notifications",
            get(notifications::handlers::handle_list),
        )
        .route(
            "/api/v1/notifications/run-follow-ups",
            post(notifications::handlers::handle_run_follow_ups),
        )
        .with_state(state)
}
