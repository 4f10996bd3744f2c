//! Stability AI (Stable Diffusion XL) image adapter

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::backend::client::{failure_from_response, LazyClient};
use crate::backend::traits::{
    GenerationRequest, GenerationResult, ImageData, ImageProvider, ProviderError, ProviderKind,
};
use crate::config::ProviderConfig;

const CONTENT_FILTERED: &str = "CONTENT_FILTERED";

#[derive(Debug, Serialize)]
struct TextToImageRequest<'a> {
    text_prompts: [TextPrompt<'a>; 1],
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

#[derive(Debug, Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
    weight: f32,
}

#[derive(Debug, Default, Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    #[serde(default)]
    base64: Option<String>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Stability error bodies put the message in `message`, or in `error` as
/// either a string or an object.
fn error_message(body: &Value) -> Option<String> {
    if let Some(message) = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
    {
        return Some(message.to_string());
    }
    match body.get("error")? {
        Value::String(message) => Some(message.clone()),
        other => other.get("message")?.as_str().map(str::to_string),
    }
}

fn extract_image(response: TextToImageResponse) -> Result<String, ProviderError> {
    let first = response
        .artifacts
        .into_iter()
        .next()
        .ok_or_else(|| {
            ProviderError::NoImageReturned("No image in Stability response".to_string())
        })?;

    match first.base64 {
        Some(data) if !data.is_empty() => Ok(data),
        _ if first.finish_reason.as_deref() == Some(CONTENT_FILTERED) => {
            Err(ProviderError::NoImageReturned("Prompt was filtered".to_string()))
        }
        _ => Err(ProviderError::NoImageReturned("No image data".to_string())),
    }
}

/// SDXL text-to-image, base64 output only
pub struct StabilityImageProvider {
    client: LazyClient,
    engine_id: String,
}

impl StabilityImageProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: LazyClient::new(ProviderKind::Stability, config),
            engine_id: config.model.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for StabilityImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Stability
    }

    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let (http, api_key) = self.client.get()?;

        debug!(engine = %self.engine_id, "Sending Stability text-to-image request");

        let body = TextToImageRequest {
            text_prompts: [TextPrompt {
                text: &request.prompt,
                weight: 1.0,
            }],
            cfg_scale: 7,
            height: 1024,
            width: 1024,
            samples: 1,
            steps: 30,
        };

        let response = http
            .post(format!(
                "{}/v1/generation/{}/text-to-image",
                self.client.base_url(),
                self.engine_id
            ))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response, error_message, |status| {
                format!("Stability API error: {}", status)
            })
            .await);
        }

        // a body that is not JSON counts as one without artifacts
        let body = response.text().await?;
        let parsed: TextToImageResponse = serde_json::from_str(&body).unwrap_or_else(|err| {
            debug!(error = %err, "Stability returned a non-JSON body");
            TextToImageResponse::default()
        });
        let data = extract_image(parsed)?;

        Ok(GenerationResult {
            image: ImageData::Base64(data),
            revised_prompt: None,
            provider: ProviderKind::Stability,
        })
    }
}
