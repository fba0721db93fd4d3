#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobOpeningRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    /// Ordered interview questions. Uploaded chunks must name one of these
    /// verbatim to be scored.
    pub questions: Vec<String>,
    /// Minimum screening score an application needs to enter the pipeline.
    pub benchmark: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicantResponseRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub name: String,
    pub email: String,
    pub score: i32,
    pub status: String,
    pub cv_keywords: Option<Value>,
    pub applied_at: DateTime<Utc>,
}

/// Pipeline status of an applicant. Stored as display strings — recruiter
/// exports read the column directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicantStatus {
    New,
    InProgress,
    Rejected,
}

impl ApplicantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicantStatus::New => "New",
            ApplicantStatus::InProgress => "In Progress",
            ApplicantStatus::Rejected => "Rejected",
        }
    }

    /// Routes a fresh application: at or above the job's benchmark enters
    /// the interview pipeline, below it is rejected outright.
    pub fn route(score: i32, benchmark: i32) -> Self {
        if score >= benchmark {
            ApplicantStatus::InProgress
        } else {
            ApplicantStatus::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_at_benchmark_enters_pipeline() {
        assert_eq!(ApplicantStatus::route(70, 70), ApplicantStatus::InProgress);
    }

    #[test]
    fn test_route_above_benchmark_enters_pipeline() {
        assert_eq!(ApplicantStatus::route(90, 70), ApplicantStatus::InProgress);
    }

    #[test]
    fn test_route_below_benchmark_rejects() {
        assert_eq!(ApplicantStatus::route(69, 70), ApplicantStatus::Rejected);
    }

    #[test]
    fn test_status_strings_match_stored_values() {
        assert_eq!(ApplicantStatus::New.as_str(), "New");
        assert_eq!(ApplicantStatus::InProgress.as_str(), "In Progress");
        assert_eq!(ApplicantStatus::Rejected.as_str(), "Rejected");
    }
}
