//! Interview session rules, kept pure so the state invariants are testable
//! without a database. `store.rs` owns loading and saving under the row
//! lock; this module owns what a loaded session is allowed to do.

use thiserror::Error;
use uuid::Uuid;

use crate::models::interview::{ScoreMap, ScoreValue};
use crate::models::job::ApplicantStatus;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Question is not part of this job's interview set: {0:?}")]
    QuestionNotInJob(String),

    #[error("Applicant {0} already has an interview session")]
    AlreadyStarted(Uuid),

    #[error("Applicant {applicant_id} is not in the interview pipeline (status {status:?})")]
    NotInPipeline { applicant_id: Uuid, status: String },
}

/// Rejects a chunk whose question is not one of the job's configured
/// questions. Matching is exact and case-sensitive: the uploaded question
/// must be a verbatim member of the set. Runs before any side effect.
pub fn validate_question(questions: &[String], question: &str) -> Result<(), SessionError> {
    if questions.iter().any(|q| q == question) {
        Ok(())
    } else {
        Err(SessionError::QuestionNotInJob(question.to_string()))
    }
}

/// Gate for session start: only applicants routed into the pipeline get an
/// interview. Rejected and unrouted applicants never had one in the hiring
/// flow.
pub fn ensure_startable(applicant_id: Uuid, status: &str) -> Result<(), SessionError> {
    if status == ApplicantStatus::InProgress.as_str() {
        Ok(())
    } else {
        Err(SessionError::NotInPipeline {
            applicant_id,
            status: status.to_string(),
        })
    }
}

/// Mutable state of one interview session, loaded under the row lock,
/// mutated here, written back in the same transaction.
#[derive(Debug, Default)]
pub struct Session {
    pub chunk_keys: Vec<String>,
    pub scores: ScoreMap,
}

impl Session {
    /// Appends a stored chunk key. Arrival order is preserved; keys are
    /// never removed or reordered.
    pub fn record_chunk(&mut self, key: String) {
        self.chunk_keys.push(key);
    }

    /// Upserts the score for a question: first answer inserts, re-answer
    /// overwrites. Keys are validated against the job's question set before
    /// this runs, so the map never grows beyond that set.
    pub fn record_score(&mut self, question: &str, score: ScoreValue) {
        self.scores.insert(question.to_string(), score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<String> {
        vec![
            "Tell me about yourself".to_string(),
            "What is regression testing?".to_string(),
        ]
    }

    #[test]
    fn test_validate_question_accepts_exact_member() {
        assert!(validate_question(&questions(), "What is regression testing?").is_ok());
    }

    #[test]
    fn test_validate_question_is_case_sensitive() {
        let err = validate_question(&questions(), "what is regression testing?");
        assert!(matches!(err, Err(SessionError::QuestionNotInJob(_))));
    }

    #[test]
    fn test_validate_question_rejects_near_miss() {
        let err = validate_question(&questions(), "What is regression testing? ");
        assert!(matches!(err, Err(SessionError::QuestionNotInJob(_))));
    }

    #[test]
    fn test_ensure_startable_requires_pipeline_status() {
        let id = Uuid::new_v4();
        assert!(ensure_startable(id, "In Progress").is_ok());
        assert!(matches!(
            ensure_startable(id, "Rejected"),
            Err(SessionError::NotInPipeline { .. })
        ));
        assert!(matches!(
            ensure_startable(id, "New"),
            Err(SessionError::NotInPipeline { .. })
        ));
    }

    #[test]
    fn test_record_chunk_appends_exactly_one() {
        let mut session = Session::default();
        session.record_chunk("interview/a/chunk_1_0000.webm".to_string());
        session.record_chunk("interview/a/chunk_2_0001.webm".to_string());

        assert_eq!(session.chunk_keys.len(), 2);
        assert_eq!(session.chunk_keys[0], "interview/a/chunk_1_0000.webm");
        assert_eq!(session.chunk_keys[1], "interview/a/chunk_2_0001.webm");
    }

    #[test]
    fn test_record_score_overwrites_instead_of_duplicating() {
        let mut session = Session::default();
        session.record_score("Q1", ScoreValue::Numeric(4.0));
        session.record_score("Q1", ScoreValue::Numeric(8.5));

        assert_eq!(session.scores.len(), 1);
        assert_eq!(session.scores["Q1"], ScoreValue::Numeric(8.5));
    }

    #[test]
    fn test_score_map_bounded_by_question_set() {
        let questions = questions();
        let mut session = Session::default();

        // Answer every question three times over; the map may not outgrow
        // the question set.
        for _ in 0..3 {
            for q in &questions {
                validate_question(&questions, q).unwrap();
                session.record_score(q, ScoreValue::Numeric(5.0));
            }
        }

        assert_eq!(session.scores.len(), questions.len());
    }

    #[test]
    fn test_chunk_keys_and_scores_move_independently() {
        let mut session = Session::default();
        session.record_chunk("k1".to_string());
        session.record_chunk("k2".to_string());
        session.record_score("Q1", ScoreValue::Numeric(7.0));

        // Two chunks, one scored question: storage quantity and score
        // quantity are distinct facts.
        assert_eq!(session.chunk_keys.len(), 2);
        assert_eq!(session.scores.len(), 1);
    }
}
