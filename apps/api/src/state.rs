use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::evaluation::scorer::AnswerScorer;
use crate::evaluation::transcriber::Transcriber;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis client reserved for a queued scoring worker.
    #[allow(dead_code)]
    pub redis: RedisClient,
    pub s3: S3Client,
    pub config: Config,
    /// Pluggable speech-to-text backend. Production: Whisper via the oracle.
    pub transcriber: Arc<dyn Transcriber>,
    /// Pluggable answer scorer. Production: gpt-4 via the oracle.
    pub scorer: Arc<dyn AnswerScorer>,
}
