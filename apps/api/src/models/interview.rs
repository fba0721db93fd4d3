#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub applicant_response_id: Uuid,
    /// S3 keys of uploaded chunks in arrival order. Append-only.
    pub chunk_keys: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewStatus {
    InProgress,
    Finalized,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::InProgress => "in_progress",
            InterviewStatus::Finalized => "finalized",
        }
    }
}

/// One scored answer. Numeric when the model obeyed the output contract,
/// otherwise the raw reply is kept verbatim for the report stage to surface
/// instead of silently coercing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreValue {
    Numeric(f64),
    Opaque(String),
}

impl ScoreValue {
    /// Parses a scoring reply. The prompt demands a bare number, but the
    /// model sometimes pads it anyway.
    pub fn from_reply(reply: &str) -> Self {
        let trimmed = reply.trim();
        match trimmed.parse::<f64>() {
            Ok(score) if score.is_finite() => ScoreValue::Numeric(score),
            _ => ScoreValue::Opaque(trimmed.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScoreValue::Numeric(n) => Some(*n),
            ScoreValue::Opaque(_) => None,
        }
    }
}

/// Question text → score, keyed by the exact question wording. One entry per
/// question; re-answering overwrites.
pub type ScoreMap = BTreeMap<String, ScoreValue>;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationResultRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub scores: Json<ScoreMap>,
    pub final_report: Option<Value>,
    pub created_at: DateTime<Utc>,
}
