//! AI feedback adapter: hands a stored résumé and instructions to the model.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::analysis::prompts::analysis_system;
use crate::llm_client::{LlmClient, LlmError};
use crate::storage::{BlobStore, StorageError};

#[derive(Debug, Error)]
pub enum FeedbackClientError {
    #[error("no file stored at {0}")]
    MissingFile(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A content part; only its text matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(default)]
    pub text: Option<String>,
}

/// Message content arrives either as a plain string or as an array of parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiMessage {
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub message: AiMessage,
}

impl AiResponse {
    /// The string itself, or the first part's text.
    pub fn text(&self) -> Option<&str> {
        match &self.message.content {
            MessageContent::Text(text) => Some(text.as_str()),
            MessageContent::Parts(parts) => parts.first().and_then(|p| p.text.as_deref()),
        }
    }
}

#[async_trait]
pub trait FeedbackClient: Send + Sync {
    /// `Ok(None)` when the backend produced no response at all.
    async fn feedback(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<Option<AiResponse>, FeedbackClientError>;
}

/// Feedback from Claude. Reads the PDF back from storage and attaches it as a
/// document block.
pub struct ClaudeFeedbackClient {
    llm: LlmClient,
    files: Arc<dyn BlobStore>,
}

impl ClaudeFeedbackClient {
    pub fn new(llm: LlmClient, files: Arc<dyn BlobStore>) -> Self {
        Self { llm, files }
    }
}

#[async_trait]
impl FeedbackClient for ClaudeFeedbackClient {
    async fn feedback(
        &self,
        file_path: &str,
        instructions: &str,
    ) -> Result<Option<AiResponse>, FeedbackClientError> {
        let pdf = self
            .files
            .get(file_path)
            .await?
            .ok_or_else(|| FeedbackClientError::MissingFile(file_path.to_string()))?;

        let response = self
            .llm
            .call_with_document(&pdf, instructions, &analysis_system())
            .await?;

        let parts: Vec<ContentPart> = response
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .map(|block| ContentPart { text: block.text })
            .collect();
        if parts.is_empty() {
            return Ok(None);
        }

        info!(
            "Feedback received for {file_path} ({} text blocks)",
            parts.len()
        );
        Ok(Some(AiResponse {
            message: AiMessage {
                content: MessageContent::Parts(parts),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_string_content() {
        let response: AiResponse =
            serde_json::from_str(r#"{"message": {"content": "{\"a\": 1}"}}"#).unwrap();
        assert_eq!(response.text(), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_array_content_uses_first_part() {
        let response: AiResponse = serde_json::from_str(
            r#"{"message": {"content": [{"text": "first"}, {"text": "second"}]}}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("first"));
    }

    #[test]
    fn test_empty_array_has_no_text() {
        let response: AiResponse =
            serde_json::from_str(r#"{"message": {"content": []}}"#).unwrap();
        assert_eq!(response.text(), None);
    }
}
