//! API request and response models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::backend::{Capabilities, GenerationResult, ImageOptions, ProviderKind, ProviderStatus};
use crate::content::ContentIdea;

/// Image generation request.
///
/// Fields are loosely typed so that a wrong type on an optional field is
/// ignored rather than rejected, and a non-string prompt gets a precise error.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct GenerateImageRequest {
    /// Text description of the image, at most 4000 characters
    #[serde(default)]
    #[schema(value_type = String)]
    pub prompt: Option<Value>,

    /// "openai", "gemini" or "stability"; omitted means automatic selection
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub provider: Option<Value>,

    /// OpenAI only: 1024x1024, 1024x1792 or 1792x1024
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub size: Option<Value>,

    /// OpenAI only: standard or hd
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub quality: Option<Value>,

    /// OpenAI only: vivid or natural
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub style: Option<Value>,

    /// OpenAI only: url or b64_json
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub response_format: Option<Value>,
}

fn as_string(value: &Option<Value>) -> Option<String> {
    value.as_ref().and_then(Value::as_str).map(str::to_string)
}

impl GenerateImageRequest {
    pub fn prompt_str(&self) -> Option<&str> {
        self.prompt.as_ref().and_then(Value::as_str)
    }

    pub fn provider_str(&self) -> Option<&str> {
        self.provider.as_ref().and_then(Value::as_str)
    }

    /// Provider-specific options, unvalidated
    pub fn options(&self) -> ImageOptions {
        ImageOptions {
            size: as_string(&self.size),
            quality: as_string(&self.quality),
            style: as_string(&self.style),
            response_format: as_string(&self.response_format),
        }
    }
}

/// Image generation response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct GenerateImageResponse {
    /// Hosted URL or base64-encoded image data
    pub image: String,

    /// Prompt as rewritten by the provider, when it does so
    #[serde(rename = "revisedPrompt", skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,

    /// Provider that produced the image
    pub provider: ProviderKind,
}

impl From<GenerationResult> for GenerateImageResponse {
    fn from(result: GenerationResult) -> Self {
        Self {
            image: result.image.into_string(),
            revised_prompt: result.revised_prompt,
            provider: result.provider,
        }
    }
}

/// One entry of the provider listing
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ProviderInfo {
    pub name: ProviderKind,
    #[serde(rename = "envKey")]
    pub env_key: String,
    pub configured: bool,
    pub capabilities: Capabilities,
}

impl From<ProviderStatus> for ProviderInfo {
    fn from(status: ProviderStatus) -> Self {
        Self {
            name: status.kind,
            env_key: status.env_key.to_string(),
            configured: status.configured,
            capabilities: status.capabilities,
        }
    }
}

/// Provider listing response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ProviderListResponse {
    pub providers: Vec<ProviderInfo>,
    /// What automatic selection would pick right now
    #[serde(rename = "default")]
    pub default_provider: Option<ProviderKind>,
}

/// Root banner
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HomeResponse {
    pub message: String,
    pub environment: String,
}

/// Health check response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub env: String,
}

/// Content-plan request
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentPlanRequest {
    /// Campaign goal, default "Branding"
    #[serde(default)]
    pub goal: Option<String>,

    /// Days to plan, 1 to 30 (default 30)
    #[serde(default)]
    #[schema(value_type = Option<u32>)]
    pub duration: Option<Value>,

    #[serde(default)]
    #[schema(value_type = Option<Vec<String>>)]
    pub platforms: Option<Value>,

    /// Audience niche, default "General"
    #[serde(default)]
    pub niche: Option<String>,

    /// First day of the plan (YYYY-MM-DD), default today
    #[serde(default)]
    pub start_date: Option<String>,
}

impl ContentPlanRequest {
    /// String entries of `platforms`; anything that is not an array is empty
    pub fn platform_names(&self) -> Vec<String> {
        match &self.platforms {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Content-plan response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ContentPlanResponse {
    pub ideas: Vec<ContentIdea>,
}

/// Caption polishing request
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct PolishCaptionRequest {
    /// Short description of the post, at least 5 characters
    #[serde(default)]
    #[schema(value_type = String)]
    pub description: Option<Value>,
}

/// Caption polishing response
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct PolishCaptionResponse {
    pub caption: String,
}
