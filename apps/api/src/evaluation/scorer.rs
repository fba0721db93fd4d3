//! Answer scoring — pluggable, trait-based scorer over the chat oracle.
//!
//! Two operations: one rubric-weighted call per uploaded answer, and one
//! holistic strengths/gaps pass at finalization. `AppState` holds an
//! `Arc<dyn AnswerScorer>`, so tests swap in a stub.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluation::prompts::{
    PATTERN_SUMMARY_PROMPT_TEMPLATE, PATTERN_SUMMARY_SYSTEM, SCORE_ANSWER_PROMPT_TEMPLATE,
    SCORE_ANSWER_SYSTEM,
};
use crate::models::interview::ScoreValue;
use crate::oracle::{OracleClient, OracleError};

#[derive(Debug, Error)]
#[error("Scoring failed: {0}")]
pub struct ScoringError(#[from] pub OracleError);

#[derive(Debug, Error)]
#[error("Pattern summary failed: {0}")]
pub struct SummarizationError(#[from] pub OracleError);

/// Strengths and gaps identified across the whole score map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSummary {
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
}

#[async_trait]
pub trait AnswerScorer: Send + Sync {
    /// Scores one transcribed answer against the job description on the
    /// weighted rubric. A reply that is not a bare number is preserved as
    /// an opaque value, never an error; `ScoringError` means the oracle
    /// call itself failed.
    async fn score_answer(
        &self,
        job_description: &str,
        question: &str,
        answer: &str,
    ) -> Result<ScoreValue, ScoringError>;

    /// Holistic pass over every numeric score, used by report aggregation.
    async fn summarize_patterns(
        &self,
        scores: &BTreeMap<String, f64>,
        job_description: &str,
    ) -> Result<PatternSummary, SummarizationError>;
}

/// Production scorer over the chat oracle.
pub struct GptScorer {
    oracle: OracleClient,
}

impl GptScorer {
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl AnswerScorer for GptScorer {
    async fn score_answer(
        &self,
        job_description: &str,
        question: &str,
        answer: &str,
    ) -> Result<ScoreValue, ScoringError> {
        let prompt = render_score_prompt(job_description, question, answer);
        let reply = self.oracle.chat(SCORE_ANSWER_SYSTEM, &prompt).await?;
        Ok(ScoreValue::from_reply(&reply))
    }

    async fn summarize_patterns(
        &self,
        scores: &BTreeMap<String, f64>,
        job_description: &str,
    ) -> Result<PatternSummary, SummarizationError> {
        let scores_json = serde_json::to_string_pretty(scores).map_err(OracleError::Parse)?;
        let prompt = PATTERN_SUMMARY_PROMPT_TEMPLATE
            .replace("{job_description}", job_description)
            .replace("{scores_json}", &scores_json);

        Ok(self
            .oracle
            .chat_json::<PatternSummary>(PATTERN_SUMMARY_SYSTEM, &prompt)
            .await?)
    }
}

/// Renders the per-answer scoring prompt. Pure so the substitution is
/// testable without an oracle.
pub fn render_score_prompt(job_description: &str, question: &str, answer: &str) -> String {
    SCORE_ANSWER_PROMPT_TEMPLATE
        .replace("{job_description}", job_description)
        .replace("{question}", question)
        .replace("{answer}", answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_score_prompt_substitutes_all_fields() {
        let prompt = render_score_prompt(
            "Senior QA engineer, automation heavy",
            "How do you triage a flaky test?",
            "I start by checking recent changes",
        );

        assert!(prompt.contains("Senior QA engineer, automation heavy"));
        assert!(prompt.contains("'How do you triage a flaky test?'"));
        assert!(prompt.contains("'I start by checking recent changes'"));
        assert!(!prompt.contains("{job_description}"));
        assert!(!prompt.contains("{question}"));
        assert!(!prompt.contains("{answer}"));
    }

    #[test]
    fn test_score_prompt_carries_rubric_weights() {
        let prompt = render_score_prompt("jd", "q", "a");

        assert!(prompt.contains("Relevance to job requirements (30% weight)"));
        assert!(prompt.contains("Technical accuracy for QA roles (25% weight)"));
        assert!(prompt.contains("Problem-solving approach (20% weight)"));
        assert!(prompt.contains("Communication clarity (15% weight)"));
        assert!(prompt.contains("Alignment with QA best practices (10% weight)"));
    }

    #[test]
    fn test_score_prompt_demands_bare_number() {
        let prompt = render_score_prompt("jd", "q", "a");
        assert!(prompt.contains("between 0-10 (1 decimal allowed)"));
        assert!(prompt.contains("Example: 7.5"));
    }

    #[test]
    fn test_pattern_summary_shape_parses() {
        let raw = r#"{"strengths": ["consistent depth"], "improvement_areas": ["brevity"]}"#;
        let summary: PatternSummary = serde_json::from_str(raw).unwrap();
        assert_eq!(summary.strengths, vec!["consistent depth"]);
        assert_eq!(summary.improvement_areas, vec!["brevity"]);
    }
}
