/// LLM Client — the single point of entry for all completion-provider calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Report generation talks to the provider through the `ChatCompleter` trait,
/// which `LlmClient` implements for any OpenAI-compatible endpoint.
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// The two model tiers offered to the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    #[default]
    Fast,
    Advanced,
}

impl ModelId {
    /// Identifier sent to the remote provider.
    pub fn remote_id(self) -> &'static str {
        match self {
            ModelId::Fast => "gpt-3.5-turbo",
            ModelId::Advanced => "gpt-4",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ModelId::Fast => "GPT-3.5 Turbo",
            ModelId::Advanced => "GPT-4",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.remote_id())
    }
}

impl FromStr for ModelId {
    type Err = String;

    /// Accepts the tier names (`fast`, `advanced`) as well as the display labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" | "gpt-3.5 turbo" | "gpt-3.5-turbo" => Ok(ModelId::Fast),
            "advanced" | "gpt-4" => Ok(ModelId::Advanced),
            other => Err(format!(
                "Unknown model '{other}'. Expected 'fast' or 'advanced'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Outcome of a provider status probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiStatus {
    pub healthy: bool,
    pub message: String,
}

/// Remote chat-completion seam. Carried in `AppState` as `Arc<dyn ChatCompleter>`
/// so handlers and tests can swap the backend.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    /// Sends `messages` to `model` and returns the text of the first completion.
    async fn complete(
        &self,
        model: ModelId,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError>;

    /// Probes the provider once. Never fails; errors are reported in the status.
    async fn check_status(&self) -> ApiStatus;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Extracts the text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat-completion provider.
/// Every call is bounded by the configured timeout; nothing is retried.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Makes a raw call to `/chat/completions`, returning the full response object.
    pub async fn call(
        &self,
        model: ModelId,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let request_body = ChatCompletionRequest {
            model: model.remote_id(),
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: provider_error_message(body),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }
}

#[async_trait]
impl ChatCompleter for LlmClient {
    async fn complete(
        &self,
        model: ModelId,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let response = self.call(model, messages, max_tokens).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    async fn check_status(&self) -> ApiStatus {
        let result = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => ApiStatus {
                healthy: true,
                message: "API is online".to_string(),
            },
            Err(e) => {
                warn!("API status check failed: {e}");
                ApiStatus {
                    healthy: false,
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Pulls `error.message` out of a provider error body, falling back to the raw body.
fn provider_error_message(body: String) -> String {
    serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
