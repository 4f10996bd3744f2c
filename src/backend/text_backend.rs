//! Chat-completion backend for the writing helpers.
//! Speaks the OpenAI `/chat/completions` API.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::backend::client::{
    failure_from_response, nested_error_message, status_message, LazyClient,
};
use crate::backend::traits::{ProviderError, ProviderKind};
use crate::config::{AssistantConfig, ProviderConfig};

/// Chat message for completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion request (OpenAI compatible)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Chat completion response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// Chat choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if it has any text
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|c| !c.trim().is_empty())
    }
}

/// Trait for text generation backends
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Model used when the caller does not pick one
    fn default_model(&self) -> &str;

    /// Sampling temperature used by the helpers
    fn temperature(&self) -> f32;

    /// One chat completion round trip
    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError>;
}

/// OpenAI chat-completions backend
pub struct OpenAIChatBackend {
    client: LazyClient,
    model: String,
    temperature: f32,
}

impl OpenAIChatBackend {
    pub fn new(provider: &ProviderConfig, assistant: &AssistantConfig) -> Self {
        Self {
            client: LazyClient::new(ProviderKind::OpenAI, provider),
            model: assistant.model.clone(),
            temperature: assistant.temperature,
        }
    }
}

#[async_trait]
impl TextBackend for OpenAIChatBackend {
    fn default_model(&self) -> &str {
        &self.model
    }

    fn temperature(&self) -> f32 {
        self.temperature
    }

    async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let (http, api_key) = self.client.get()?;

        debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let response = http
            .post(format!("{}/chat/completions", self.client.base_url()))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response, nested_error_message, status_message).await);
        }

        Ok(response.json::<ChatCompletionResponse>().await?)
    }
}

/// Build the assistant when an OpenAI key is configured
pub fn create_text_backend(
    provider: &ProviderConfig,
    assistant: &AssistantConfig,
) -> Option<Arc<dyn TextBackend>> {
    if !provider.is_configured() {
        return None;
    }
    Some(Arc::new(OpenAIChatBackend::new(provider, assistant)))
}
