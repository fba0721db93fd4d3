/// Job/question registry and application intake.
///
/// A job opening owns the ordered interview questions and the screening
/// benchmark; applications are routed against that benchmark exactly once,
/// at creation.
pub mod cv;
pub mod handlers;

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{ApplicantResponseRow, JobOpeningRow};

pub struct NewJobOpening<'a> {
    pub company_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub requirements: &'a str,
    pub questions: &'a [String],
    pub benchmark: i32,
}

pub async fn create_job(db: &PgPool, job: NewJobOpening<'_>) -> Result<JobOpeningRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO job_openings (id, company_id, title, description, requirements, questions, benchmark)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(job.company_id)
    .bind(job.title)
    .bind(job.description)
    .bind(job.requirements)
    .bind(job.questions)
    .bind(job.benchmark)
    .fetch_one(db)
    .await
}

pub async fn fetch_job(db: &PgPool, job_id: Uuid) -> Result<Option<JobOpeningRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM job_openings WHERE id = $1")
        .bind(job_id)
        .fetch_optional(db)
        .await
}

pub struct NewApplicant<'a> {
    pub job_id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub score: i32,
    pub status: &'a str,
    pub cv_keywords: Option<Value>,
}

pub async fn create_applicant(
    db: &PgPool,
    applicant: NewApplicant<'_>,
) -> Result<ApplicantResponseRow, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO applicant_responses (id, job_id, name, email, score, status, cv_keywords)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(applicant.job_id)
    .bind(applicant.name)
    .bind(applicant.email)
    .bind(applicant.score)
    .bind(applicant.status)
    .bind(applicant.cv_keywords)
    .fetch_one(db)
    .await
}
