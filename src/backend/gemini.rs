//! Google Gemini image adapter (generateContent with the IMAGE modality)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::backend::client::{
    failure_from_response, nested_error_message, status_message, LazyClient,
};
use crate::backend::traits::{
    GenerationRequest, GenerationResult, ImageData, ImageProvider, ProviderError, ProviderKind,
};
use crate::config::ProviderConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason_message: Option<String>,
}

/// Gemini image generation, base64 output only
pub struct GeminiImageProvider {
    client: LazyClient,
    model: String,
}

impl GeminiImageProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: LazyClient::new(ProviderKind::Gemini, config),
            model: config.model.clone(),
        }
    }
}

fn extract_image(response: GenerateContentResponse) -> Result<String, ProviderError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason_message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "No image generated".to_string());
        return Err(ProviderError::NoImageReturned(reason));
    };

    candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.inline_data.and_then(|d| d.data))
        .find(|data| !data.is_empty())
        .ok_or_else(|| {
            ProviderError::NoImageReturned("No image data in Gemini response".to_string())
        })
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let (http, api_key) = self.client.get()?;

        debug!(model = %self.model, "Sending Gemini image request");

        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(request.prompt.clone()),
                    inline_data: None,
                }],
            }],
            generation_config: json!({ "responseModalities": ["TEXT", "IMAGE"] }),
        };

        let response = http
            .post(format!(
                "{}/models/{}:generateContent",
                self.client.base_url(),
                self.model
            ))
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response, nested_error_message, status_message).await);
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let data = extract_image(parsed)?;

        Ok(GenerationResult {
            image: ImageData::Base64(data),
            revised_prompt: None,
            provider: ProviderKind::Gemini,
        })
    }
}
