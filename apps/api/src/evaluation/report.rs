//! Report Aggregator — folds the accumulated score map into the fixed-shape
//! summary recruiters see.
//!
//! Aggregation is strict on its inputs: every stored score must be numeric.
//! A score the model answered in prose aborts the report with the offending
//! question named, rather than zeroing it into the mean.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::scorer::{AnswerScorer, SummarizationError};
use crate::models::interview::{ScoreMap, ScoreValue};

/// Copy for report fields no automated signal backs yet. The interview
/// pipeline scores verbal answers only, so these stay fixed until a
/// dedicated signal exists.
pub const COMMUNICATION_PLACEHOLDER: &str = "Decent articulation; lacks job specificity";
pub const RECOMMENDATION_PLACEHOLDER: &str = "Do not progress";
const NONE_IDENTIFIED: &str = "None identified";

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("No scored answers to report on")]
    Empty,

    #[error("Stored score for {question:?} is not numeric: {value:?}")]
    ScoreParse { question: String, value: String },

    #[error(transparent)]
    Summarization(#[from] SummarizationError),
}

impl ReportError {
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Empty => "EMPTY_REPORT",
            ReportError::ScoreParse { .. } => "SCORE_PARSE_ERROR",
            ReportError::Summarization(_) => "SUMMARIZATION_ERROR",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Report shape
// ────────────────────────────────────────────────────────────────────────────

/// Recruiter-facing summary of one interview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub question_count: usize,
    pub mean_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Display string "mean/count", e.g. "6.75/2".
    pub overall: String,
    pub strengths: String,
    pub key_skill_gaps: String,
    pub communication: String,
    pub recommendation: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Aggregation
// ────────────────────────────────────────────────────────────────────────────

/// Builds the final report from the stored score map. Repeatable: every call
/// recomputes from whatever the map holds now. The stored map is never
/// modified here, so a failed report leaves the bad entry inspectable.
pub async fn aggregate(
    scores: &ScoreMap,
    job_description: &str,
    scorer: &dyn AnswerScorer,
) -> Result<FinalReport, ReportError> {
    if scores.is_empty() {
        return Err(ReportError::Empty);
    }

    let mut numeric: BTreeMap<String, f64> = BTreeMap::new();
    for (question, value) in scores {
        match value {
            ScoreValue::Numeric(n) => {
                numeric.insert(question.clone(), *n);
            }
            ScoreValue::Opaque(raw) => {
                return Err(ReportError::ScoreParse {
                    question: question.clone(),
                    value: raw.clone(),
                });
            }
        }
    }

    let count = numeric.len();
    let sum: f64 = numeric.values().sum();
    let mean = sum / count as f64;
    let max = numeric.values().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
    let min = numeric.values().fold(f64::INFINITY, |a, &b| a.min(b));

    let summary = scorer.summarize_patterns(&numeric, job_description).await?;

    Ok(FinalReport {
        question_count: count,
        mean_score: mean,
        max_score: max,
        min_score: min,
        overall: format!("{mean:.2}/{count}"),
        strengths: join_or_default(&summary.strengths),
        key_skill_gaps: join_or_default(&summary.improvement_areas),
        communication: COMMUNICATION_PLACEHOLDER.to_string(),
        recommendation: RECOMMENDATION_PLACEHOLDER.to_string(),
    })
}

fn join_or_default(items: &[String]) -> String {
    if items.is_empty() {
        NONE_IDENTIFIED.to_string()
    } else {
        items.join(", ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::scorer::{PatternSummary, ScoringError};
    use crate::oracle::OracleError;
    use async_trait::async_trait;

    struct StubScorer {
        strengths: Vec<String>,
        improvement_areas: Vec<String>,
        fail_summary: bool,
    }

    impl StubScorer {
        fn with_summary(strengths: Vec<&str>, improvement_areas: Vec<&str>) -> Self {
            Self {
                strengths: strengths.into_iter().map(String::from).collect(),
                improvement_areas: improvement_areas.into_iter().map(String::from).collect(),
                fail_summary: false,
            }
        }

        fn failing() -> Self {
            Self {
                strengths: vec![],
                improvement_areas: vec![],
                fail_summary: true,
            }
        }
    }

    #[async_trait]
    impl AnswerScorer for StubScorer {
        async fn score_answer(
            &self,
            _job_description: &str,
            _question: &str,
            _answer: &str,
        ) -> Result<ScoreValue, ScoringError> {
            Ok(ScoreValue::Numeric(5.0))
        }

        async fn summarize_patterns(
            &self,
            _scores: &BTreeMap<String, f64>,
            _job_description: &str,
        ) -> Result<PatternSummary, SummarizationError> {
            if self.fail_summary {
                return Err(SummarizationError(OracleError::EmptyContent));
            }
            Ok(PatternSummary {
                strengths: self.strengths.clone(),
                improvement_areas: self.improvement_areas.clone(),
            })
        }
    }

    fn scores(entries: &[(&str, ScoreValue)]) -> ScoreMap {
        entries
            .iter()
            .map(|(q, v)| (q.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_map_is_empty_report_error() {
        let scorer = StubScorer::with_summary(vec![], vec![]);
        let err = aggregate(&ScoreMap::new(), "jd", &scorer).await.unwrap_err();

        assert!(matches!(err, ReportError::Empty));
        assert_eq!(err.code(), "EMPTY_REPORT");
    }

    #[tokio::test]
    async fn test_aggregates_count_mean_max_min() {
        let scorer = StubScorer::with_summary(vec!["depth"], vec!["pace"]);
        let map = scores(&[
            ("Q1", ScoreValue::Numeric(7.5)),
            ("Q2", ScoreValue::Numeric(6.0)),
        ]);

        let report = aggregate(&map, "jd", &scorer).await.unwrap();

        assert_eq!(report.question_count, 2);
        assert_eq!(report.mean_score, 6.75);
        assert_eq!(report.max_score, 7.5);
        assert_eq!(report.min_score, 6.0);
        assert_eq!(report.overall, "6.75/2");
    }

    #[tokio::test]
    async fn test_single_score_report() {
        let scorer = StubScorer::with_summary(vec![], vec![]);
        let map = scores(&[("Q1", ScoreValue::Numeric(7.0))]);

        let report = aggregate(&map, "jd", &scorer).await.unwrap();

        assert_eq!(report.question_count, 1);
        assert_eq!(report.mean_score, 7.0);
        assert_eq!(report.max_score, 7.0);
        assert_eq!(report.min_score, 7.0);
        assert_eq!(report.overall, "7.00/1");
    }

    #[tokio::test]
    async fn test_opaque_score_aborts_with_question_named() {
        let scorer = StubScorer::with_summary(vec![], vec![]);
        let map = scores(&[
            ("Q1", ScoreValue::Numeric(7.5)),
            ("Q2", ScoreValue::Opaque("the model rambled".to_string())),
        ]);

        let err = aggregate(&map, "jd", &scorer).await.unwrap_err();

        assert_eq!(err.code(), "SCORE_PARSE_ERROR");
        match err {
            ReportError::ScoreParse { question, value } => {
                assert_eq!(question, "Q2");
                assert_eq!(value, "the model rambled");
            }
            other => panic!("expected ScoreParse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summary_failure_propagates() {
        let scorer = StubScorer::failing();
        let map = scores(&[("Q1", ScoreValue::Numeric(5.0))]);

        let err = aggregate(&map, "jd", &scorer).await.unwrap_err();
        assert_eq!(err.code(), "SUMMARIZATION_ERROR");
    }

    #[tokio::test]
    async fn test_strengths_and_gaps_joined() {
        let scorer =
            StubScorer::with_summary(vec!["clear reasoning", "test design"], vec!["SQL depth"]);
        let map = scores(&[("Q1", ScoreValue::Numeric(8.0))]);

        let report = aggregate(&map, "jd", &scorer).await.unwrap();

        assert_eq!(report.strengths, "clear reasoning, test design");
        assert_eq!(report.key_skill_gaps, "SQL depth");
    }

    #[tokio::test]
    async fn test_empty_summary_lists_fall_back() {
        let scorer = StubScorer::with_summary(vec![], vec![]);
        let map = scores(&[("Q1", ScoreValue::Numeric(8.0))]);

        let report = aggregate(&map, "jd", &scorer).await.unwrap();

        assert_eq!(report.strengths, "None identified");
        assert_eq!(report.key_skill_gaps, "None identified");
    }

    #[tokio::test]
    async fn test_placeholder_fields_are_fixed_copy() {
        let scorer = StubScorer::with_summary(vec!["x"], vec!["y"]);
        let map = scores(&[("Q1", ScoreValue::Numeric(8.0))]);

        let report = aggregate(&map, "jd", &scorer).await.unwrap();

        assert_eq!(report.communication, "Decent articulation; lacks job specificity");
        assert_eq!(report.recommendation, "Do not progress");
    }
}
