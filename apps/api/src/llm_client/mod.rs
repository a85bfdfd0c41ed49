//! LLM client: the single point of entry for all Claude API calls in ResumeX.
//!
//! No other module may call the Anthropic API directly; the feedback adapter
//! goes through here.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for résumé analysis.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: Vec<RequestBlock<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Text { text: &'a str },
    Document { source: DocumentSource<'a> },
}

#[derive(Debug, Serialize)]
struct DocumentSource<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    media_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Wraps the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(120))
                .build()?,
            api_key,
        })
    }

    /// Sends a PDF document plus a text prompt in a single user turn.
    pub async fn call_with_document(
        &self,
        pdf: &[u8],
        prompt: &str,
        system: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: vec![
                    RequestBlock::Document {
                        source: DocumentSource {
                            source_type: "base64",
                            media_type: "application/pdf",
                            data: STANDARD.encode(pdf),
                        },
                    },
                    RequestBlock::Text { text: prompt },
                ],
            }],
        };
        self.send(&request_body).await
    }

    /// Posts one request. A 429 means the request was refused before the
    /// model ran, so it is the only status worth sending again.
    async fn send(&self, request_body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .json(request_body)
                .send()
                .await?;

            match response.status() {
                StatusCode::TOO_MANY_REQUESTS if attempt < MAX_RATE_LIMIT_RETRIES => {
                    attempt += 1;
                    let delay = rate_limit_backoff(attempt);
                    warn!(
                        "Anthropic API rate limited, retry {attempt}/{MAX_RATE_LIMIT_RETRIES} in {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(LlmError::RateLimited { retries: attempt });
                }
                status if !status.is_success() => {
                    let body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<AnthropicError>(&body)
                        .map(|e| e.error.message)
                        .unwrap_or(body);
                    return Err(LlmError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }
                _ => {
                    let parsed: LlmResponse = response.json().await?;
                    debug!(
                        input_tokens = parsed.usage.input_tokens,
                        output_tokens = parsed.usage.output_tokens,
                        "Anthropic call finished"
                    );
                    return Ok(parsed);
                }
            }
        }
    }
}

/// 1s, 2s, 4s, ...
fn rate_limit_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(5))
}

/// Removes a surrounding markdown code fence (with or without a language tag).
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.trim_start();
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
