//! Model gateway: the single point of entry for all provider calls.
//!
//! No other module may talk to OpenRouter directly. Services build a prompt,
//! resolve a model through [`catalog`], and hand both to a [`ModelGateway`].
//!
//! Exactly one round trip per call: no retry, no streaming. The underlying HTTP
//! client carries an explicit timeout so a hung provider cannot hang a request.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod catalog;
pub mod json;
pub mod prompts;

#[cfg(test)]
pub mod stub;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENROUTER_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI model returned invalid JSON. Please try again or use a different model.")]
    MalformedResponse { fragment: String },
}

/// Sampling limits for one use case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionProfile {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionProfile {
    pub const ANALYSIS: Self = Self {
        max_tokens: 1000,
        temperature: 0.3,
    };
    pub const ENHANCEMENT: Self = Self {
        max_tokens: 2000,
        temperature: 0.3,
    };
    pub const SECTION: Self = Self {
        max_tokens: 500,
        temperature: 0.4,
    };
}

#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    /// Provider-specific model id, already resolved through the catalog.
    pub model: &'a str,
    pub profile: CompletionProfile,
}

/// Token accounting as reported by the provider; relayed to the caller verbatim.
///
/// Only the three standard counts are named. Provider extras (`cost`,
/// `prompt_tokens_details`, ...) ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Empty when the provider returned no choices.
    pub text: String,
    pub usage: Option<Usage>,
}

/// A model entry from the provider's catalogue listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderModel {
    pub id: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

/// Seam between the services and the remote provider.
///
/// Carried in `AppState` as `Arc<dyn ModelGateway>` so routes can run against
/// a stub in tests.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError>;

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError>;

    /// Returns the `data` object of the provider's key-status endpoint.
    async fn key_status(&self) -> Result<Value, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    /// Decoded separately so an odd usage block cannot sink the completion.
    #[serde(default)]
    usage: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_completion(self) -> Completion {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        let usage = self.usage.and_then(|raw| {
            serde_json::from_value(raw)
                .map_err(|e| warn!("Ignoring unreadable usage block: {e}"))
                .ok()
        });
        Completion { text, usage }
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ProviderModel>,
}

#[derive(Debug, Deserialize)]
struct KeyStatus {
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// OpenRouter client. Built once at startup from [`Config`] and never mutated.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    http_referer: String,
    app_title: String,
}

impl OpenRouterClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.openrouter_api_key.clone(),
            base_url: config.openrouter_base_url.trim_end_matches('/').to_string(),
            http_referer: config.http_referer.clone(),
            app_title: config.app_title.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, LlmError> {
        self.api_key.as_deref().ok_or(LlmError::MissingApiKey)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Turns a non-2xx response into `LlmError::Api`, preferring the provider's
    /// own error message over the raw body.
    async fn check_status(response: Response) -> Result<Response, LlmError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("Provider returned {}: {}", status, body);
        let message = serde_json::from_str::<ProviderError>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });

        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ModelGateway for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<Completion, LlmError> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: request.prompt,
            }],
            temperature: request.profile.temperature,
            max_tokens: request.profile.max_tokens,
        };

        debug!(
            "Requesting completion: model={} max_tokens={} prompt_chars={}",
            request.model,
            request.profile.max_tokens,
            request.prompt.len()
        );

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(api_key)
            .header("HTTP-Referer", &self.http_referer)
            .header("X-Title", &self.app_title)
            .json(&body)
            .send()
            .await?;

        let response: ChatResponse = Self::check_status(response).await?.json().await?;
        let completion = response.into_completion();

        if let Some(usage) = &completion.usage {
            debug!(
                "Completion succeeded: prompt_tokens={:?}, completion_tokens={:?}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(completion)
    }

    async fn list_models(&self) -> Result<Vec<ProviderModel>, LlmError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.url("models"))
            .bearer_auth(api_key)
            .send()
            .await?;

        let list: ModelList = Self::check_status(response).await?.json().await?;
        Ok(list.data)
    }

    async fn key_status(&self) -> Result<Value, LlmError> {
        let api_key = self.api_key()?;

        let response = self
            .client
            .get(self.url("auth/key"))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status: KeyStatus = Self::check_status(response).await?.json().await?;
        Ok(status.data)
    }
}
