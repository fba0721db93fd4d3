//! Ingestion orchestrator — one synchronous unit of work per uploaded chunk.
//!
//! Ordering rule: validation happens before any side effect; the chunk is
//! persisted before the oracle stages run; oracle-stage failures are
//! reported per chunk on a stored chunk, never as an HTTP failure.

use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::report::{self, FinalReport, ReportError};
use crate::evaluation::scorer::ScoringError;
use crate::evaluation::session::{self, Session, SessionError};
use crate::evaluation::storage;
use crate::evaluation::store;
use crate::evaluation::transcriber::TranscriptionError;
use crate::media::{self, ExtractionError};
use crate::models::interview::{InterviewRow, InterviewStatus, ScoreValue};
use crate::state::AppState;

/// A failure in one of the oracle stages for a single chunk. The chunk
/// itself is already persisted when one of these happens.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Transcription(#[from] TranscriptionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl ChunkError {
    pub fn code(&self) -> &'static str {
        match self {
            ChunkError::Extraction(_) => "EXTRACTION_ERROR",
            ChunkError::Transcription(_) => "TRANSCRIPTION_ERROR",
            ChunkError::Scoring(_) => "SCORING_ERROR",
        }
    }

    fn fault(&self) -> PipelineFault {
        PipelineFault {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Code + message pair surfaced inside the chunk envelope for failures that
/// happen after the chunk is stored.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineFault {
    pub code: &'static str,
    pub message: String,
}

/// One uploaded chunk, parsed out of the multipart request.
pub struct ChunkUpload {
    pub question: String,
    pub data: Bytes,
    pub finalize: bool,
}

/// Outcome envelope for a chunk upload. `chunk_stored` and `scored` are
/// distinct facts: a chunk that survived upload but failed an oracle stage
/// reports `chunk_stored: true, scored: false` plus the fault, never a bare
/// success.
#[derive(Debug, Serialize)]
pub struct ChunkOutcome {
    pub interview_id: Uuid,
    pub question: String,
    pub chunk_key: String,
    pub chunk_stored: bool,
    pub scored: bool,
    pub score: Option<ScoreValue>,
    pub scoring_error: Option<PipelineFault>,
    pub finalized: bool,
    pub report: Option<FinalReport>,
    pub report_error: Option<PipelineFault>,
}

/// Opens the one interview session an applicant may have. 409 on a second
/// start; applicants outside the pipeline are rejected up front.
pub async fn start_session(
    state: &AppState,
    applicant_response_id: Uuid,
) -> Result<InterviewRow, AppError> {
    let mut conn = state.db.acquire().await?;

    let applicant = store::fetch_applicant(&mut conn, applicant_response_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Applicant {applicant_response_id} not found")))?;

    session::ensure_startable(applicant.id, &applicant.status)?;

    let interview = store::create_interview(&mut conn, applicant_response_id)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.is_unique_violation() {
                    return AppError::from(SessionError::AlreadyStarted(applicant_response_id));
                }
            }
            AppError::Database(err)
        })?;

    info!(
        "Started interview {} for applicant {applicant_response_id}",
        interview.id
    );
    Ok(interview)
}

/// Processes one uploaded chunk end to end:
/// lock session row → validate question → persist chunk (S3 + key append) →
/// extract → transcribe → score → upsert score → optional finalize → commit.
pub async fn process_chunk(
    state: &AppState,
    interview_id: Uuid,
    upload: ChunkUpload,
) -> Result<ChunkOutcome, AppError> {
    let mut tx = state.db.begin().await?;

    // The row lock serializes concurrent uploads for this interview; other
    // interviews proceed in parallel.
    let interview = store::lock_interview(&mut tx, interview_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interview {interview_id} not found")))?;

    let applicant = store::fetch_applicant(&mut tx, interview.applicant_response_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Interview {interview_id} references missing applicant {}",
                interview.applicant_response_id
            ))
        })?;

    let job = store::fetch_job(&mut tx, applicant.job_id).await?.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!(
            "Applicant {} references missing job {}",
            applicant.id,
            applicant.job_id
        ))
    })?;

    // Reject before any side effect.
    session::validate_question(&job.questions, &upload.question)?;

    let mut session = Session {
        chunk_keys: interview.chunk_keys,
        scores: store::fetch_evaluation(&mut tx, interview_id)
            .await?
            .map(|row| row.scores.0)
            .unwrap_or_default(),
    };

    // Persist the chunk first: S3 object, then the key appended to the
    // session. If the oracle stages fail afterwards the footage is kept.
    let chunk_key = storage::chunk_key(interview_id, Utc::now(), session.chunk_keys.len());
    storage::put_chunk(&state.s3, &state.config.s3_bucket, &chunk_key, upload.data.clone()).await?;
    session.record_chunk(chunk_key.clone());
    store::save_chunk_keys(&mut tx, interview_id, &session.chunk_keys).await?;

    let (score, scoring_error) =
        match score_chunk(state, &job.description, &upload.question, &upload.data).await {
            Ok(value) => (Some(value), None),
            Err(err) => {
                warn!("Chunk {chunk_key} stored but not scored: {err}");
                (None, Some(err.fault()))
            }
        };

    if let Some(value) = &score {
        session.record_score(&upload.question, value.clone());
        store::upsert_scores(&mut tx, interview_id, &session.scores).await?;
    }

    let mut finalized = false;
    let mut final_report = None;
    let mut report_error = None;

    if upload.finalize {
        match report::aggregate(&session.scores, &job.description, state.scorer.as_ref()).await {
            Ok(built) => {
                let rendered = serde_json::to_value(&built).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Failed to render final report: {e}"))
                })?;
                store::save_final_report(&mut tx, interview_id, &rendered).await?;
                store::set_interview_status(
                    &mut tx,
                    interview_id,
                    InterviewStatus::Finalized.as_str(),
                )
                .await?;
                finalized = true;
                final_report = Some(built);
            }
            Err(err) => {
                warn!("Finalize failed for interview {interview_id}: {err}");
                report_error = Some(report_fault(&err));
            }
        }
    }

    tx.commit().await?;

    info!(
        "Chunk {chunk_key} for interview {interview_id}: scored={} finalized={finalized}",
        score.is_some()
    );

    Ok(ChunkOutcome {
        interview_id,
        question: upload.question,
        chunk_key,
        chunk_stored: true,
        scored: score.is_some(),
        score,
        scoring_error,
        finalized,
        report: final_report,
        report_error,
    })
}

/// The oracle stages for one chunk: spool to disk, strip the audio,
/// transcribe it, score the answer. Each stage's temp file is dropped as
/// soon as the next stage no longer needs it.
async fn score_chunk(
    state: &AppState,
    job_description: &str,
    question: &str,
    data: &[u8],
) -> Result<ScoreValue, ChunkError> {
    let spooled = media::spool_chunk(data).await?;
    let audio = media::extract_audio(&state.config.ffmpeg_bin, spooled.path()).await?;
    drop(spooled);

    let transcript = state.transcriber.transcribe(audio.path()).await?;
    debug!("Transcript for {question:?}: {} chars", transcript.len());

    let score = state
        .scorer
        .score_answer(job_description, question, &transcript)
        .await?;
    Ok(score)
}

fn report_fault(err: &ReportError) -> PipelineFault {
    PipelineFault {
        code: err.code(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::OracleError;

    #[test]
    fn test_chunk_error_codes() {
        let extraction = ChunkError::from(ExtractionError::TimedOut(
            std::time::Duration::from_secs(120),
        ));
        assert_eq!(extraction.code(), "EXTRACTION_ERROR");

        let transcription = ChunkError::from(TranscriptionError(OracleError::EmptyContent));
        assert_eq!(transcription.code(), "TRANSCRIPTION_ERROR");

        let scoring = ChunkError::from(ScoringError(OracleError::EmptyContent));
        assert_eq!(scoring.code(), "SCORING_ERROR");
    }

    #[test]
    fn test_fault_carries_code_and_message() {
        let err = ChunkError::from(TranscriptionError(OracleError::EmptyContent));
        let fault = err.fault();

        assert_eq!(fault.code, "TRANSCRIPTION_ERROR");
        assert!(fault.message.contains("Transcription failed"));
    }

    #[test]
    fn test_report_fault_codes() {
        let fault = report_fault(&ReportError::Empty);
        assert_eq!(fault.code, "EMPTY_REPORT");

        let fault = report_fault(&ReportError::ScoreParse {
            question: "Q1".to_string(),
            value: "n/a".to_string(),
        });
        assert_eq!(fault.code, "SCORE_PARSE_ERROR");
        assert!(fault.message.contains("Q1"));
    }
}
