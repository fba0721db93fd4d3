pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers as interviews;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

/// Upload cap for the multipart routes. Interview chunks arrive as short
/// webm segments far under this; the cap is a backstop, not a target.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job registry + application intake
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route(
            "/api/v1/jobs/:id/questions",
            get(jobs::handle_job_questions),
        )
        .route(
            "/api/v1/jobs/:id/applications",
            post(jobs::handle_apply).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Interview evaluation pipeline
        .route(
            "/api/v1/interviews",
            post(interviews::handle_start_interview),
        )
        .route(
            "/api/v1/interviews/:id/chunks",
            post(interviews::handle_upload_chunk).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/api/v1/applications/:id/report",
            get(interviews::handle_fetch_report),
        )
        .with_state(state)
}
