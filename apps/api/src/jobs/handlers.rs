use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::{self, cv, NewApplicant, NewJobOpening};
use crate::models::job::{ApplicantResponseRow, ApplicantStatus, JobOpeningRow};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateJobRequest {
    pub company_id: Uuid,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub questions: Vec<String>,
    pub benchmark: i32,
}

#[derive(Serialize)]
pub struct JobQuestionsResponse {
    pub job_id: Uuid,
    pub title: String,
    pub questions: Vec<String>,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobOpeningRow>), AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Job title must not be empty".to_string()));
    }
    if req.questions.is_empty() || req.questions.iter().any(|q| q.trim().is_empty()) {
        return Err(AppError::Validation(
            "A job opening needs at least one non-empty interview question".to_string(),
        ));
    }
    if req.benchmark < 0 {
        return Err(AppError::Validation(
            "Screening benchmark must not be negative".to_string(),
        ));
    }

    let row = jobs::create_job(
        &state.db,
        NewJobOpening {
            company_id: req.company_id,
            title: &req.title,
            description: &req.description,
            requirements: &req.requirements,
            questions: &req.questions,
            benchmark: req.benchmark,
        },
    )
    .await?;

    info!(
        "Created job opening {} with {} interview questions",
        row.id,
        row.questions.len()
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/jobs/:id/questions
pub async fn handle_job_questions(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobQuestionsResponse>, AppError> {
    let job = jobs::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job opening {job_id} not found")))?;

    Ok(Json(JobQuestionsResponse {
        job_id: job.id,
        title: job.title,
        questions: job.questions,
    }))
}

/// POST /api/v1/jobs/:id/applications
///
/// Multipart form: `name`, `email`, `score` (integer screening score) and an
/// optional `cv` PDF. The application is routed against the job benchmark
/// exactly once, here.
pub async fn handle_apply(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApplicantResponseRow>), AppError> {
    let job = jobs::fetch_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job opening {job_id} not found")))?;

    let mut name: Option<String> = None;
    let mut email: Option<String> = None;
    let mut score: Option<i32> = None;
    let mut cv_bytes: Option<bytes::Bytes> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name() {
            Some("name") => name = Some(field.text().await.map_err(bad_multipart)?),
            Some("email") => email = Some(field.text().await.map_err(bad_multipart)?),
            Some("score") => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let parsed = raw.trim().parse::<i32>().map_err(|_| {
                    AppError::Validation(format!("Screening score must be an integer, got {raw:?}"))
                })?;
                score = Some(parsed);
            }
            Some("cv") => cv_bytes = Some(field.bytes().await.map_err(bad_multipart)?),
            _ => {}
        }
    }

    let name = name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing applicant name".to_string()))?;
    let email = email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Missing applicant email".to_string()))?;
    let score =
        score.ok_or_else(|| AppError::Validation("Missing screening score".to_string()))?;

    // PDF parsing is CPU-bound; keep it off the runtime threads.
    let cv_keywords = match cv_bytes {
        Some(pdf) => tokio::task::spawn_blocking(move || cv::scan_cv(&pdf))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("CV scan task failed: {e}")))?,
        None => None,
    };

    let status = ApplicantStatus::route(score, job.benchmark);
    let row = jobs::create_applicant(
        &state.db,
        NewApplicant {
            job_id,
            name: &name,
            email: &email,
            score,
            status: status.as_str(),
            cv_keywords,
        },
    )
    .await?;

    info!(
        "Application {} for job {} scored {} against benchmark {}: {}",
        row.id, job_id, score, job.benchmark, row.status
    );
    Ok((StatusCode::CREATED, Json(row)))
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Malformed multipart request: {err}"))
}
