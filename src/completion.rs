//! Client for the chat-style completion endpoint.
//!
//! The [`CompletionClient`] trait is the seam between the pipeline and the
//! remote model: one async operation taking an instruction plus a body of
//! content and returning the first completion choice's text. The trait is
//! annotated for `mockall` so tests can run the pipeline against a
//! deterministic stub endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::config::CompletionConfig;
use crate::error::{AlchemistError, Result};

/// One stateless call to a completion endpoint. Implemented by the HTTP
/// client and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends `instruction` as the system message and `content` as the user
    /// message, returning the reply text.
    async fn complete(&self, instruction: &str, content: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Reqwest-backed client against an OpenAI-compatible chat-completions
/// endpoint. Holds the caller-supplied credential for the lifetime of one
/// run; the credential is never logged.
pub struct HttpCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    max_tokens: u32,
    api_key: String,
}

impl HttpCompletionClient {
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| AlchemistError::NetworkFailure {
                reason: e.to_string(),
            })?;

        info!(
            endpoint = %config.endpoint,
            model = %config.model,
            api_key_len = api_key.len(),
            "Completion client constructed"
        );

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_key,
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, instruction: &str, content: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: instruction.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: content.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
        };

        debug!(
            instruction_bytes = instruction.len(),
            content_bytes = content.len(),
            "Sending completion request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AlchemistError::NetworkFailure {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlchemistError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| AlchemistError::UnexpectedResponseFormat {
                    reason: e.to_string(),
                })?;

        let reply = extract_reply(chat_response)?;
        debug!(reply_bytes = reply.len(), "Completion reply received");
        Ok(reply)
    }
}

/// Pulls the first choice's message content out of a decoded response.
fn extract_reply(response: ChatResponse) -> Result<String> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AlchemistError::UnexpectedResponseFormat {
            reason: "response carries no choices".to_string(),
        })?;

    choice
        .message
        .content
        .ok_or_else(|| AlchemistError::UnexpectedResponseFormat {
            reason: "first choice carries no message content".to_string(),
        })
}
