//! Monthly stats aggregation.
//!
//! Every run is a full recomputation from current record state — a
//! deterministic function of its inputs — followed by one conflict-checked
//! upsert. Concurrent runs for the same user are safe: last writer wins
//! with an identical-or-fresher row, and the `(user_id, month)` key stays
//! unique.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::stats::MonthlyStatsRow;
use crate::store::{ApplicationStore, StatsStore};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// First calendar day of the month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> NaiveDate {
    now.date_naive()
        .with_day(1)
        .expect("the first of the month is always a valid date")
}

/// Pure aggregation over one user's current-month applications.
///
/// `avg_response_days` averages `(last_updated - applied_date)` over the
/// applications that moved past `applied`; 0 when none have.
pub fn compute_monthly_stats(
    user_id: Uuid,
    month: NaiveDate,
    apps: &[ApplicationRow],
) -> MonthlyStatsRow {
    let count = |status: ApplicationStatus| {
        apps.iter().filter(|a| a.status == status.as_str()).count() as i32
    };

    let responded: Vec<&ApplicationRow> = apps
        .iter()
        .filter(|a| a.status != ApplicationStatus::Applied.as_str())
        .collect();
    let avg_response_days = if responded.is_empty() {
        0.0
    } else {
        let total_days: f64 = responded
            .iter()
            .map(|a| (a.last_updated - a.applied_date).num_seconds() as f64 / SECONDS_PER_DAY)
            .sum();
        total_days / responded.len() as f64
    };

    MonthlyStatsRow {
        user_id,
        month,
        total_applications: apps.len() as i32,
        applied_count: count(ApplicationStatus::Applied),
        screening_count: count(ApplicationStatus::Screening),
        interview_count: count(ApplicationStatus::Interview),
        offer_count: count(ApplicationStatus::Offer),
        rejected_count: count(ApplicationStatus::Rejected),
        avg_response_days,
    }
}

/// Recomputes and upserts the current month's row for one user.
/// No-op (returns `None`) when the user has no applications this month.
pub async fn update_monthly_stats(
    applications: &dyn ApplicationStore,
    stats: &dyn StatsStore,
    user_id: Uuid,
) -> Result<Option<MonthlyStatsRow>, AppError> {
    let month = month_start(Utc::now());
    let since = month.and_time(NaiveTime::MIN).and_utc();

    let apps = applications.find_since(user_id, since).await?;
    if apps.is_empty() {
        return Ok(None);
    }

    let row = compute_monthly_stats(user_id, month, &apps);
    stats.upsert(&row).await?;
    Ok(Some(row))
}

/// All of a user's monthly rows, newest month first.
pub async fn get_user_stats(
    stats: &dyn StatsStore,
    user_id: Uuid,
) -> Result<Vec<MonthlyStatsRow>, AppError> {
    Ok(stats.list_for_user(user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::TimelineEntry;
    use crate::store::applications::InMemoryApplicationStore;
    use crate::store::stats::InMemoryStatsStore;
    use chrono::TimeZone;
    use sqlx::types::Json;

    fn app_with(
        user_id: Uuid,
        status: &str,
        applied: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> ApplicationRow {
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
            last_updated: updated,
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

    fn march(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn month_start_is_first_of_month() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 9, 30, 0).unwrap();
        assert_eq!(
            month_start(now),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
        );
    }

    #[test]
    fn computes_counts_and_average_response_days() {
        let user_id = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let apps = vec![
            app_with(user_id, "applied", march(5), march(5)),
            // responded after 3 days
            app_with(user_id, "interview", march(1), march(4)),
            // responded after 8 days
            app_with(user_id, "offer", march(2), march(10)),
        ];

        let row = compute_monthly_stats(user_id, month, &apps);
        assert_eq!(row.total_applications, 3);
        assert_eq!(row.applied_count, 1);
        assert_eq!(row.screening_count, 0);
        assert_eq!(row.interview_count, 1);
        assert_eq!(row.offer_count, 1);
        assert_eq!(row.rejected_count, 0);
        assert!((row.avg_response_days - 5.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejected_count_counts_rejections_not_offers() {
        let user_id = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let apps = vec![
            app_with(user_id, "offer", march(1), march(4)),
            app_with(user_id, "rejected", march(2), march(6)),
            app_with(user_id, "rejected", march(3), march(9)),
        ];

        let row = compute_monthly_stats(user_id, month, &apps);
        assert_eq!(row.offer_count, 1);
        assert_eq!(row.rejected_count, 2);
    }

    #[test]
    fn no_responded_applications_means_zero_average() {
        let user_id = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let apps = vec![app_with(user_id, "applied", march(1), march(1))];

        let row = compute_monthly_stats(user_id, month, &apps);
        assert_eq!(row.avg_response_days, 0.0);
    }

    #[test]
    fn recomputation_is_deterministic() {
        let user_id = Uuid::new_v4();
        let month = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let apps = vec![
            app_with(user_id, "screening", march(1), march(3)),
            app_with(user_id, "applied", march(2), march(2)),
        ];

        let first = compute_monthly_stats(user_id, month, &apps);
        let second = compute_monthly_stats(user_id, month, &apps);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_is_a_noop_without_current_month_applications() {
        let applications = InMemoryApplicationStore::new();
        let stats = InMemoryStatsStore::new();
        let user_id = Uuid::new_v4();

        let result = update_monthly_stats(&applications, &stats, user_id)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(stats.list_for_user(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn repeated_updates_keep_one_row_per_month() {
        let applications = InMemoryApplicationStore::new();
        let stats = InMemoryStatsStore::new();
        let user_id = Uuid::new_v4();

        let now = Utc::now();
        applications
            .insert(app_with(user_id, "applied", now, now))
            .await
            .unwrap();
        applications
            .insert(app_with(user_id, "interview", now, now))
            .await
            .unwrap();

        let first = update_monthly_stats(&applications, &stats, user_id)
            .await
            .unwrap()
            .unwrap();
        let second = update_monthly_stats(&applications, &stats, user_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, second);

        let rows = stats.list_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_applications, 2);
    }

    #[tokio::test]
    async fn concurrent_updates_never_produce_duplicate_rows() {
        let applications = InMemoryApplicationStore::new();
        let stats = InMemoryStatsStore::new();
        let user_id = Uuid::new_v4();

        let now = Utc::now();
        applications
            .insert(app_with(user_id, "offer", now, now))
            .await
            .unwrap();

        let (a, b, c) = tokio::join!(
            update_monthly_stats(&applications, &stats, user_id),
            update_monthly_stats(&applications, &stats, user_id),
            update_monthly_stats(&applications, &stats, user_id),
        );
        // Full recomputation: whichever write lands last, the rows agree.
        let a = a.unwrap().unwrap();
        let b = b.unwrap().unwrap();
        let c = c.unwrap().unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);

        let rows = stats.list_for_user(user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }
}
