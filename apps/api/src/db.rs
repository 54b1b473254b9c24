use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates every table the application needs if it does not exist yet.
/// Idempotent; runs once at startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            company TEXT NOT NULL,
            position TEXT NOT NULL,
            job_description TEXT,
            job_url TEXT,
            platform TEXT NOT NULL DEFAULT 'Direct',
            location TEXT,
            salary_range JSONB,
            status TEXT NOT NULL DEFAULT 'applied',
            applied_date TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            last_updated TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            timeline JSONB NOT NULL DEFAULT '[]',
            notes TEXT,
            resume_used UUID,
            cover_letter TEXT,
            ai_suggestions JSONB,
            follow_up_sent BOOLEAN NOT NULL DEFAULT FALSE,
            follow_up_date TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_applications_user_applied
         ON applications (user_id, applied_date)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resumes (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            file_name TEXT NOT NULL,
            file_url TEXT,
            extracted_text TEXT,
            version TEXT NOT NULL DEFAULT 'v1',
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_default BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_resumes_user ON resumes (user_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ai_tasks (
            id UUID PRIMARY KEY,
            task_type TEXT NOT NULL,
            payload JSONB NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            result JSONB,
            error TEXT,
            enqueued_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_ai_tasks_claim
         ON ai_tasks (status, task_type, enqueued_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS application_stats (
            user_id UUID NOT NULL,
            month DATE NOT NULL,
            total_applications INT NOT NULL DEFAULT 0,
            applied_count INT NOT NULL DEFAULT 0,
            screening_count INT NOT NULL DEFAULT 0,
            interview_count INT NOT NULL DEFAULT 0,
            offer_count INT NOT NULL DEFAULT 0,
            rejected_count INT NOT NULL DEFAULT 0,
            avg_response_days DOUBLE PRECISION NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, month)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notifications (
            id UUID PRIMARY KEY,
            user_id UUID NOT NULL,
            application_id UUID,
            kind TEXT NOT NULL,
            message TEXT NOT NULL,
            sent_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            is_read BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications (user_id)")
        .execute(pool)
        .await?;

    info!("Database schema ensured");
    Ok(())
}
