//! Follow-up reminders for applications that went quiet.
//!
//! The sweep uses the same discipline as the result reconciler: each
//! application is claimed with a conditional mark-sent update before its
//! notification row is written, so re-running the sweep (or running two
//! concurrently) never double-notifies. Actual email delivery is an
//! external concern; the sweep records the reminder and logs it.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::ApplicationStatus;
use crate::models::notification::{NotificationKind, NotificationRow};
use crate::store::{ApplicationStore, NotificationStore};

/// Applications still waiting after this many days get a reminder.
pub const FOLLOW_UP_AFTER_DAYS: i64 = 7;

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// One pass over stale applications. Returns how many reminders were
/// recorded. Idempotent: an application is processed at most once ever.
pub async fn run_follow_up_sweep(
    applications: &dyn ApplicationStore,
    notifications: &dyn NotificationStore,
    now: DateTime<Utc>,
) -> Result<usize, AppError> {
    let cutoff = now - chrono::Duration::days(FOLLOW_UP_AFTER_DAYS);
    let stale = applications
        .find_stale_unnotified(
            &[ApplicationStatus::Applied, ApplicationStatus::Screening],
            cutoff,
        )
        .await?;

    let mut processed = 0;
    for app in stale {
        // Claim first; a parallel sweep that lost the race skips the row.
        if !applications.mark_follow_up_sent(app.id, now).await? {
            continue;
        }
        let message = format!(
            "Follow-up reminder sent for {} at {}",
            app.position, app.company
        );
        notifications
            .insert(NotificationRow {
                id: Uuid::new_v4(),
                user_id: app.user_id,
                application_id: Some(app.id),
                kind: NotificationKind::FollowUp.as_str().to_string(),
                message,
                sent_at: now,
                is_read: false,
            })
            .await?;
        info!(application_id = %app.id, company = %app.company, "follow-up reminder recorded");
        processed += 1;
    }
    Ok(processed)
}

pub async fn get_user_notifications(
    notifications: &dyn NotificationStore,
    user_id: Uuid,
) -> Result<Vec<NotificationRow>, AppError> {
    Ok(notifications.list_for_user(user_id).await?)
}

/// Daily sweep loop, spawned alongside the workers.
pub async fn run_follow_up_scheduler(
    applications: Arc<dyn ApplicationStore>,
    notifications: Arc<dyn NotificationStore>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Follow-up scheduler started (daily sweep)");
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                match run_follow_up_sweep(applications.as_ref(), notifications.as_ref(), Utc::now())
                    .await
                {
                    Ok(n) => info!("Processed {n} follow-up reminders"),
                    Err(e) => error!("Follow-up sweep failed: {e}"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("Follow-up scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{ApplicationRow, TimelineEntry};
    use crate::store::applications::InMemoryApplicationStore;
    use crate::store::notifications::InMemoryNotificationStore;
    use sqlx::types::Json;

    fn app_with(user_id: Uuid, status: &str, applied: DateTime<Utc>) -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            user_id,
            company: "Acme".to_string(),
            position: "Engineer".to_string(),
            job_description: None,
            job_url: None,
            platform: "Direct".to_string(),
            location: None,
            salary_range: None,
            status: status.to_string(),
            applied_date: applied,
            last_updated: applied,
            timeline: Json(vec![TimelineEntry {
                status: status.to_string(),
                date: applied,
                notes: None,
            }]),
            notes: None,
            resume_used: None,
            cover_letter: None,
            ai_suggestions: None,
            follow_up_sent: false,
            follow_up_date: None,
            created_at: applied,
        }
    }

    #[tokio::test]
    async fn sweep_records_reminders_for_stale_waiting_applications() {
        let applications = InMemoryApplicationStore::new();
        let notifications = InMemoryNotificationStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let stale = applications
            .insert(app_with(user_id, "applied", now - chrono::Duration::days(10)))
            .await
            .unwrap();
        // Too recent and already-responded applications are left alone.
        applications
            .insert(app_with(user_id, "applied", now - chrono::Duration::days(2)))
            .await
            .unwrap();
        applications
            .insert(app_with(user_id, "interview", now - chrono::Duration::days(20)))
            .await
            .unwrap();

        let processed = run_follow_up_sweep(&applications, &notifications, now)
            .await
            .unwrap();
        assert_eq!(processed, 1);

        let marked = applications
            .find_owned(stale.id, user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(marked.follow_up_sent);
        assert_eq!(marked.follow_up_date, Some(now));

        let rows = notifications.list_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].kind, "follow_up");
        assert_eq!(rows[0].application_id, Some(stale.id));
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let applications = InMemoryApplicationStore::new();
        let notifications = InMemoryNotificationStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        applications
            .insert(app_with(user_id, "screening", now - chrono::Duration::days(14)))
            .await
            .unwrap();

        let first = run_follow_up_sweep(&applications, &notifications, now)
            .await
            .unwrap();
        let second = run_follow_up_sweep(&applications, &notifications, now)
            .await
            .unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 0);
        assert_eq!(notifications.list_for_user(user_id).await.unwrap().len(), 1);
    }
}
