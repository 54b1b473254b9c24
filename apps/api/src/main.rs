mod analytics;
mod applications;
mod config;
mod db;
mod errors;
mod jobs;
mod llm_client;
mod models;
mod notifications;
mod resumes;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::jobs::dispatcher::{Dispatcher, JobContext};
use crate::jobs::queue::PgTaskQueue;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::applications::PgApplicationStore;
use crate::store::notifications::PgNotificationStore;
use crate::store::resumes::PgResumeStore;
use crate::store::stats::PgStatsStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobTrack API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let pool = create_pool(&config.database_url).await?;
    ensure_schema(&pool).await?;

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    ));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Durable stores and the task queue
    let queue = Arc::new(PgTaskQueue::new(pool.clone()));
    let applications = Arc::new(PgApplicationStore::new(pool.clone()));
    let resumes = Arc::new(PgResumeStore::new(pool.clone()));
    let stats = Arc::new(PgStatsStore::new(pool.clone()));
    let notifications = Arc::new(PgNotificationStore::new(pool.clone()));

    // Spawn AI worker dispatchers. They share one context; the queue's
    // atomic claim keeps them from ever running the same task.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctx = JobContext {
        queue: queue.clone(),
        applications: applications.clone(),
        resumes: resumes.clone(),
        llm: llm.clone(),
    };
    for n in 0..config.worker_count {
        let dispatcher = Dispatcher::new(ctx.clone());
        let rx = shutdown_rx.clone();
        tokio::spawn(async move {
            info!("Spawning AI worker {n}");
            dispatcher.run(rx).await;
        });
    }

    // Daily follow-up sweep
    tokio::spawn(notifications::service::run_follow_up_scheduler(
        applications.clone(),
        notifications.clone(),
        shutdown_rx.clone(),
    ));

    // Build app state
    let state = AppState {
        db: pool,
        config: config.clone(),
        llm,
        queue,
        applications,
        resumes,
        stats,
        notifications,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    drop(shutdown_tx);
    Ok(())
}
