use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::evaluation::pipeline::{self, ChunkOutcome, ChunkUpload};
use crate::evaluation::store;
use crate::models::interview::{InterviewRow, ScoreMap};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartInterviewRequest {
    pub applicant_response_id: Uuid,
}

/// POST /api/v1/interviews
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(req): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let interview = pipeline::start_session(&state, req.applicant_response_id).await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

/// POST /api/v1/interviews/:id/chunks
///
/// Multipart form: `chunk` (binary video), `question` (exact text of one of
/// the job's questions), optional `final` ("true" to build the report after
/// this chunk).
pub async fn handle_upload_chunk(
    State(state): State<AppState>,
    Path(interview_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ChunkOutcome>, AppError> {
    let mut question: Option<String> = None;
    let mut data: Option<Bytes> = None;
    let mut finalize = false;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("chunk") => data = Some(field.bytes().await.map_err(bad_multipart)?),
            Some("question") => question = Some(field.text().await.map_err(bad_multipart)?),
            Some("final") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                finalize = parse_final_flag(&raw)?;
            }
            _ => {}
        }
    }

    let question = question
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing question field".to_string()))?;
    let data = data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("Missing chunk payload".to_string()))?;

    let outcome = pipeline::process_chunk(
        &state,
        interview_id,
        ChunkUpload {
            question,
            data,
            finalize,
        },
    )
    .await?;

    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct ReportResponse {
    pub interview_id: Uuid,
    pub applicant_response_id: Uuid,
    pub status: String,
    pub scores: ScoreMap,
    pub final_report: Option<Value>,
}

/// GET /api/v1/applications/:id/report
///
/// Keyed by the applicant pipeline id, not the interview id — recruiters
/// browse applications. Empty scores and a null report are a valid state
/// for a session with nothing scored yet.
pub async fn handle_fetch_report(
    State(state): State<AppState>,
    Path(applicant_id): Path<Uuid>,
) -> Result<Json<ReportResponse>, AppError> {
    let mut conn = state.db.acquire().await?;

    let interview = store::interview_for_applicant(&mut conn, applicant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No interview for applicant {applicant_id}")))?;

    let (scores, final_report) = match store::fetch_evaluation(&mut conn, interview.id).await? {
        Some(row) => (row.scores.0, row.final_report),
        None => (ScoreMap::new(), None),
    };

    Ok(Json(ReportResponse {
        interview_id: interview.id,
        applicant_response_id: applicant_id,
        status: interview.status,
        scores,
        final_report,
    }))
}

fn parse_final_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" | "" => Ok(false),
        other => Err(AppError::Validation(format!(
            "final flag must be a boolean, got {other:?}"
        ))),
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart request: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_final_flag() {
        assert!(parse_final_flag("true").unwrap());
        assert!(parse_final_flag("TRUE").unwrap());
        assert!(parse_final_flag("1").unwrap());
        assert!(!parse_final_flag("false").unwrap());
        assert!(!parse_final_flag("0").unwrap());
        assert!(!parse_final_flag("").unwrap());
        assert!(parse_final_flag("yes").is_err());
    }
}
