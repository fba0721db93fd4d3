//! Speech-to-text seam. `AppState` carries an `Arc<dyn Transcriber>` so
//! tests can stub the transcript without network access.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::oracle::{OracleClient, OracleError};

#[derive(Debug, Error)]
#[error("Transcription failed: {0}")]
pub struct TranscriptionError(#[from] pub OracleError);

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Turns an extracted audio file into the candidate's spoken answer.
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError>;
}

/// Production transcriber backed by the Whisper API.
pub struct WhisperTranscriber {
    oracle: OracleClient,
}

impl WhisperTranscriber {
    pub fn new(oracle: OracleClient) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String, TranscriptionError> {
        Ok(self.oracle.transcribe(audio_path).await?)
    }
}
