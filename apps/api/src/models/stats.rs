#![allow(dead_code)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One aggregate row per (user, month). `month` is the first calendar day.
/// Recomputed wholesale on every aggregation pass — never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MonthlyStatsRow {
    pub user_id: Uuid,
    pub month: NaiveDate,
    pub total_applications: i32,
    pub applied_count: i32,
    pub screening_count: i32,
    pub interview_count: i32,
    pub offer_count: i32,
    pub rejected_count: i32,
    pub avg_response_days: f64,
}
