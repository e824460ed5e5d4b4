//! Generation client: HTTP access to the Gemini-style text generation endpoint.
//!
//! The refine pipeline never talks to the network directly; it goes through the
//! `TextGenerator` trait, which this client implements.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::refine::generator::TextGenerator;
use crate::refine::strategy::Instruction;

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta2/models/gemini/text:generate";
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No candidates returned")]
    EmptyResponse,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl ServiceError {
    /// Short reason embedded in a degraded candidate's text.
    pub fn reason(&self) -> String {
        match self {
            ServiceError::Status { status, .. } => status.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateTextRequest<'a> {
    prompt: TextPrompt<'a>,
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTextResponse {
    #[serde(default)]
    pub candidates: Vec<TextCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct TextCandidate {
    pub output: Option<String>,
}

impl GenerateTextResponse {
    /// Output of the first candidate, if it carries any non-blank text.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.output.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini text-generation client. Cheap to clone; the inner `reqwest::Client` is shared.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_url: String,
    api_key: String,
    max_attempts: u32,
}

impl GeminiClient {
    pub fn new(
        api_url: String,
        api_key: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
            max_attempts: max_attempts.max(1),
        })
    }

    /// Sends one instruction. Retries on transport errors, 429 and 5xx with
    /// exponential backoff, up to `max_attempts` attempts in total.
    pub async fn call(&self, instruction: &Instruction) -> Result<GenerateTextResponse, ServiceError> {
        let request_body = GenerateTextRequest {
            prompt: TextPrompt {
                text: &instruction.text,
            },
            temperature: instruction.temperature,
            max_output_tokens: instruction.max_output_tokens,
        };

        let mut last_error: Option<ServiceError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                warn!(
                    "Generation call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.api_url)
                .query(&[("key", self.api_key.as_str())])
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(ServiceError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Generation API returned {}: {}", status, body);
                last_error = Some(ServiceError::Status {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(ServiceError::Status {
                    status: status.as_u16(),
                    message,
                });
            }

            let body = response.text().await?;
            let parsed: GenerateTextResponse = serde_json::from_str(&body)
                .map_err(|e| ServiceError::Malformed(e.to_string()))?;

            debug!(
                strategy = ?instruction.strategy,
                candidates = parsed.candidates.len(),
                "Generation call succeeded"
            );

            return Ok(parsed);
        }

        Err(last_error.unwrap_or(ServiceError::EmptyResponse))
    }
}

/// Delay before retry number `attempt` (1-based): 500ms, 1s, 2s, ... saturating.
fn backoff_delay(attempt: u32) -> Duration {
    let factor = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(BACKOFF_BASE_MS.saturating_mul(factor))
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn complete(&self, instruction: &Instruction) -> Result<String, ServiceError> {
        let response = self.call(instruction).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(ServiceError::EmptyResponse)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
