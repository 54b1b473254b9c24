#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The five-stage application lifecycle. Stored as lowercase text in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Screening,
    Interview,
    Offer,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Screening,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Screening => "screening",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "screening" => Ok(ApplicationStatus::Screening),
            "interview" => Ok(ApplicationStatus::Interview),
            "offer" => Ok(ApplicationStatus::Offer),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// One append-only history entry. Every status mutation adds exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: String,
    pub date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Structured output of a resume-to-job-description analysis.
/// All five lists are required; `matchScore` must be numeric — a response
/// missing any of them does not deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub skills_to_emphasize: Vec<String>,
    pub experience_to_highlight: Vec<String>,
    pub recommended_changes: Vec<String>,
    pub match_score: i64,
}

/// Last analysis applied to an application, with its generation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestions {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub position: String,
    pub job_description: Option<String>,
    pub job_url: Option<String>,
    pub platform: String,
    pub location: Option<String>,
    pub salary_range: Option<Json<SalaryRange>>,
    pub status: String,
    pub applied_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub timeline: Json<Vec<TimelineEntry>>,
    pub notes: Option<String>,
    pub resume_used: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub ai_suggestions: Option<Json<AiSuggestions>>,
    pub follow_up_sent: bool,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Request body for creating an application.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationInput {
    pub company: String,
    pub position: String,
    pub job_description: Option<String>,
    pub job_url: Option<String>,
    pub platform: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRange>,
    pub status: Option<String>,
    pub applied_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub resume_used: Option<Uuid>,
}

/// Partial update of descriptive fields. Status and timeline are
/// deliberately absent — those move only through the status transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateApplicationInput {
    pub company: Option<String>,
    pub position: Option<String>,
    pub job_description: Option<String>,
    pub job_url: Option<String>,
    pub platform: Option<String>,
    pub location: Option<String>,
    pub salary_range: Option<SalaryRange>,
    pub notes: Option<String>,
    pub resume_used: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilters {
    pub status: Option<String>,
    pub platform: Option<String>,
    pub company: Option<String>,
    /// Sort key; leading `-` means descending, e.g. `-lastUpdated`.
    pub sort_by: Option<String>,
}

/// Whitelisted sort orders for application listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationSort {
    AppliedDateAsc,
    AppliedDateDesc,
    LastUpdatedAsc,
    LastUpdatedDesc,
}

impl ApplicationSort {
    /// Parses the original API's sort convention. Unknown keys fall back to
    /// newest-first by applied date.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return ApplicationSort::AppliedDateDesc;
        };
        let (field, desc) = match raw.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        match (field, desc) {
            ("appliedDate" | "applied_date", false) => ApplicationSort::AppliedDateAsc,
            ("appliedDate" | "applied_date", true) => ApplicationSort::AppliedDateDesc,
            ("lastUpdated" | "last_updated", false) => ApplicationSort::LastUpdatedAsc,
            ("lastUpdated" | "last_updated", true) => ApplicationSort::LastUpdatedDesc,
            _ => ApplicationSort::AppliedDateDesc,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            ApplicationSort::AppliedDateAsc => " ORDER BY applied_date ASC",
            ApplicationSort::AppliedDateDesc => " ORDER BY applied_date DESC",
            ApplicationSort::LastUpdatedAsc => " ORDER BY last_updated ASC",
            ApplicationSort::LastUpdatedDesc => " ORDER BY last_updated DESC",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(ApplicationStatus::from_str("ghosted").is_err());
    }

    #[test]
    fn analysis_result_requires_all_fields() {
        // missing matchScore
        let json = r#"{
            "keywords": ["rust"],
            "missingKeywords": [],
            "skillsToEmphasize": [],
            "experienceToHighlight": [],
            "recommendedChanges": []
        }"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn analysis_result_rejects_string_score() {
        let json = r#"{
            "keywords": [],
            "missingKeywords": [],
            "skillsToEmphasize": [],
            "experienceToHighlight": [],
            "recommendedChanges": [],
            "matchScore": "85"
        }"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn analysis_result_accepts_empty_lists() {
        let json = r#"{
            "keywords": [],
            "missingKeywords": [],
            "skillsToEmphasize": [],
            "experienceToHighlight": [],
            "recommendedChanges": [],
            "matchScore": 0
        }"#;
        let parsed: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.match_score, 0);
    }

    #[test]
    fn sort_parses_original_api_convention() {
        assert_eq!(
            ApplicationSort::parse(None),
            ApplicationSort::AppliedDateDesc
        );
        assert_eq!(
            ApplicationSort::parse(Some("lastUpdated")),
            ApplicationSort::LastUpdatedAsc
        );
        assert_eq!(
            ApplicationSort::parse(Some("-lastUpdated")),
            ApplicationSort::LastUpdatedDesc
        );
        assert_eq!(
            ApplicationSort::parse(Some("nonsense")),
            ApplicationSort::AppliedDateDesc
        );
    }
}
