//! Interview and evaluation persistence. Every function takes a
//! `&mut PgConnection` so callers decide the transaction scope; chunk
//! processing runs them all inside one transaction that holds the interview
//! row lock, which serializes concurrent uploads for the same interview.

use sqlx::types::Json;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::interview::{EvaluationResultRow, InterviewRow, InterviewStatus, ScoreMap};
use crate::models::job::{ApplicantResponseRow, JobOpeningRow};

/// Loads the interview and locks its row for the rest of the transaction.
pub async fn lock_interview(
    conn: &mut PgConnection,
    interview_id: Uuid,
) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM interviews WHERE id = $1 FOR UPDATE")
        .bind(interview_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn fetch_applicant(
    conn: &mut PgConnection,
    applicant_id: Uuid,
) -> Result<Option<ApplicantResponseRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM applicant_responses WHERE id = $1")
        .bind(applicant_id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn fetch_job(
    conn: &mut PgConnection,
    job_id: Uuid,
) -> Result<Option<JobOpeningRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM job_openings WHERE id = $1")
        .bind(job_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Creates the one interview an applicant may have. The UNIQUE constraint
/// on `applicant_response_id` turns a duplicate start into a database error
/// the caller maps to a conflict.
pub async fn create_interview(
    conn: &mut PgConnection,
    applicant_response_id: Uuid,
) -> Result<InterviewRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO interviews (id, applicant_response_id, chunk_keys, status)
        VALUES ($1, $2, '{}', $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(applicant_response_id)
    .bind(InterviewStatus::InProgress.as_str())
    .fetch_one(&mut *conn)
    .await
}

pub async fn interview_for_applicant(
    conn: &mut PgConnection,
    applicant_response_id: Uuid,
) -> Result<Option<InterviewRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM interviews WHERE applicant_response_id = $1")
        .bind(applicant_response_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Writes back the full chunk key list. Callers only ever append to the
/// loaded list, so this never shrinks the stored array.
pub async fn save_chunk_keys(
    conn: &mut PgConnection,
    interview_id: Uuid,
    chunk_keys: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE interviews SET chunk_keys = $2 WHERE id = $1")
        .bind(interview_id)
        .bind(chunk_keys)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn fetch_evaluation(
    conn: &mut PgConnection,
    interview_id: Uuid,
) -> Result<Option<EvaluationResultRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM evaluation_results WHERE interview_id = $1")
        .bind(interview_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Upserts the whole score map. The evaluation row is created lazily on the
/// first scored chunk; one row per interview.
pub async fn upsert_scores(
    conn: &mut PgConnection,
    interview_id: Uuid,
    scores: &ScoreMap,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO evaluation_results (id, interview_id, scores)
        VALUES ($1, $2, $3)
        ON CONFLICT (interview_id) DO UPDATE SET scores = EXCLUDED.scores
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(interview_id)
    .bind(Json(scores))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn save_final_report(
    conn: &mut PgConnection,
    interview_id: Uuid,
    report: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE evaluation_results SET final_report = $2 WHERE interview_id = $1")
        .bind(interview_id)
        .bind(report)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn set_interview_status(
    conn: &mut PgConnection,
    interview_id: Uuid,
    status: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE interviews SET status = $2 WHERE id = $1")
        .bind(interview_id)
        .bind(status)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
