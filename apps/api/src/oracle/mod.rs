/// Oracle client — the single point of entry for all OpenAI calls in Greenroom.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// Transcription and evaluation both go through this client so retry and
/// error handling live in one place.
///
/// Models: gpt-4 for evaluation, whisper-1 for speech-to-text
/// (hardcoded — do not make configurable to prevent drift)
use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const CHAT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const TRANSCRIPTION_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
/// The model used for all evaluation calls in Greenroom.
/// This is intentionally hardcoded to prevent accidental drift.
pub const SCORING_MODEL: &str = "gpt-4";
/// The speech-to-text model. Whisper caps uploads at 25 MB per request;
/// the mono 16kbps extraction keeps interview chunks comfortably under that.
pub const TRANSCRIPTION_MODEL: &str = "whisper-1";
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Oracle returned empty content")]
    EmptyContent,

    #[error("Failed to read audio file: {0}")]
    AudioRead(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// The single OpenAI client shared by transcription and scoring.
/// Wraps the chat completions and audio transcription endpoints with
/// retry logic and structured output helpers.
#[derive(Clone)]
pub struct OracleClient {
    client: Client,
    api_key: String,
}

impl OracleClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Sends a system + user message pair to the chat completions API and
    /// returns the assistant's reply text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let request_body = ChatRequest {
            model: SCORING_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
        };

        let mut last_error: Option<OracleError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Chat call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(CHAT_API_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(OracleError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Chat API returned {}: {}", status, body);
                last_error = Some(OracleError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                // Try to parse error message
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OracleError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            debug!(
                "Chat call succeeded: prompt_tokens={}, completion_tokens={}",
                chat_response.usage.prompt_tokens, chat_response.usage.completion_tokens
            );

            return chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(OracleError::EmptyContent);
        }

        Err(last_error.unwrap_or(OracleError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the chat API and deserializes the reply as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn chat_json<T: DeserializeOwned>(
        &self,
        system: &str,
        user: &str,
    ) -> Result<T, OracleError> {
        let text = self.chat(system, user).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(OracleError::Parse)
    }

    /// Uploads an audio file to the transcription API and returns the raw
    /// transcript. `response_format=text` makes the body the transcript
    /// itself, no JSON envelope to unwrap.
    /// Retries on 429 and 5xx like `chat`.
    pub async fn transcribe(&self, audio_path: &Path) -> Result<String, OracleError> {
        let audio = tokio::fs::read(audio_path).await?;
        debug!("Uploading {} bytes of audio for transcription", audio.len());

        let mut last_error: Option<OracleError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "Transcription attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            // A multipart form is consumed on send, so rebuild it each attempt.
            let form = Form::new()
                .part("file", Part::bytes(audio.clone()).file_name("audio.mp3"))
                .text("model", TRANSCRIPTION_MODEL)
                .text("response_format", "text");

            let response = self
                .client
                .post(TRANSCRIPTION_API_URL)
                .bearer_auth(&self.api_key)
                .multipart(form)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(OracleError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Transcription API returned {}: {}", status, body);
                last_error = Some(OracleError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OracleError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response.text().await?);
        }

        Err(last_error.unwrap_or(OracleError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"strengths\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"strengths\": []}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"strengths\": []}\n```";
        assert_eq!(strip_json_fences(input), "{\"strengths\": []}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"strengths\": []}";
        assert_eq!(strip_json_fences(input), "{\"strengths\": []}");
    }

    #[test]
    fn test_chat_response_extracts_first_choice() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "7.5"}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 3}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(content, "7.5");
    }
}
