//! OpenAI (DALL-E 3) image adapter

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::client::{
    failure_from_response, nested_error_message, status_message, LazyClient,
};
use crate::backend::traits::{
    GenerationRequest, GenerationResult, ImageData, ImageOptions, ImageProvider, ProviderError,
    ProviderKind,
};
use crate::config::ProviderConfig;

pub const VALID_SIZES: [&str; 3] = ["1024x1024", "1024x1792", "1792x1024"];
pub const VALID_QUALITY: [&str; 2] = ["standard", "hd"];
pub const VALID_STYLE: [&str; 2] = ["vivid", "natural"];
pub const VALID_RESPONSE_FORMAT: [&str; 2] = ["url", "b64_json"];

/// Options after allow-list filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedOptions {
    pub size: &'static str,
    pub quality: &'static str,
    pub style: &'static str,
    pub response_format: &'static str,
}

fn pick(value: Option<&str>, allowed: &[&'static str]) -> &'static str {
    value
        .and_then(|v| allowed.iter().copied().find(|a| *a == v))
        .unwrap_or(allowed[0])
}

/// Replace anything outside the allow-lists with the default. Never an error.
pub fn sanitize_options(options: &ImageOptions) -> SanitizedOptions {
    SanitizedOptions {
        size: pick(options.size.as_deref(), &VALID_SIZES),
        quality: pick(options.quality.as_deref(), &VALID_QUALITY),
        style: pick(options.style.as_deref(), &VALID_STYLE),
        response_format: pick(options.response_format.as_deref(), &VALID_RESPONSE_FORMAT),
    }
}

#[derive(Debug, Serialize)]
struct ImagesRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageItem>,
}

#[derive(Debug, Deserialize)]
struct ImageItem {
    url: Option<String>,
    b64_json: Option<String>,
    revised_prompt: Option<String>,
}

/// DALL-E 3 over the OpenAI images API
pub struct OpenAIImageProvider {
    client: LazyClient,
    model: String,
}

impl OpenAIImageProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: LazyClient::new(ProviderKind::OpenAI, config),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ImageProvider for OpenAIImageProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let (http, api_key) = self.client.get()?;
        let options = sanitize_options(&request.options);

        debug!(
            model = %self.model,
            size = options.size,
            quality = options.quality,
            style = options.style,
            response_format = options.response_format,
            "Sending OpenAI image request"
        );

        let body = ImagesRequest {
            model: &self.model,
            prompt: &request.prompt,
            n: 1,
            size: options.size,
            quality: options.quality,
            style: options.style,
            response_format: options.response_format,
        };

        let response = http
            .post(format!("{}/images/generations", self.client.base_url()))
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response, nested_error_message, status_message).await);
        }

        let parsed: ImagesResponse = response.json().await?;
        let item = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| {
                ProviderError::NoImageReturned("No image data in OpenAI response".to_string())
            })?;

        let image = match (item.url, item.b64_json) {
            (Some(url), _) if !url.is_empty() => ImageData::Url(url),
            (_, Some(data)) if !data.is_empty() => ImageData::Base64(data),
            _ => {
                return Err(ProviderError::NoImageReturned(
                    "Image generation did not return data".to_string(),
                ))
            }
        };

        Ok(GenerationResult {
            image,
            revised_prompt: item.revised_prompt,
            provider: ProviderKind::OpenAI,
        })
    }
}
