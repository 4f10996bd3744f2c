//! Image provider trait and the types shared by every adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

/// The three supported image-generation services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAI,
    Gemini,
    Stability,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::OpenAI,
        ProviderKind::Gemini,
        ProviderKind::Stability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Stability => "stability",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn env_key(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "OPENAI_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::Stability => "STABILITY_API_KEY",
        }
    }

    /// What the provider can hand back and accept
    pub fn capabilities(&self) -> Capabilities {
        match self {
            ProviderKind::OpenAI => Capabilities {
                url: true,
                base64: true,
                options: true,
            },
            ProviderKind::Gemini | ProviderKind::Stability => Capabilities {
                url: false,
                base64: true,
                options: false,
            },
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ();

    /// Exact, case-sensitive match on the wire names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ProviderKind::OpenAI),
            "gemini" => Ok(ProviderKind::Gemini),
            "stability" => Ok(ProviderKind::Stability),
            _ => Err(()),
        }
    }
}

/// Capability flags reported by the provider listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Can return a hosted URL
    pub url: bool,
    /// Can return inline base64 data
    pub base64: bool,
    /// Honours size / quality / style / response_format
    pub options: bool,
}

/// Tuning knobs only the OpenAI adapter understands. Unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub size: Option<String>,
    pub quality: Option<String>,
    pub style: Option<String>,
    pub response_format: Option<String>,
}

/// A validated generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Already trimmed and length-checked
    pub prompt: String,
    pub options: ImageOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: ImageOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }
}

/// Image payload: a hosted URL or inline base64, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageData {
    Url(String),
    Base64(String),
}

impl ImageData {
    /// The string handed to clients in the `image` field
    pub fn as_str(&self) -> &str {
        match self {
            ImageData::Url(url) => url,
            ImageData::Base64(data) => data,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            ImageData::Url(url) => url,
            ImageData::Base64(data) => data,
        }
    }

    pub fn is_url(&self) -> bool {
        matches!(self, ImageData::Url(_))
    }
}

/// Normalized output of a successful generation
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub image: ImageData,
    pub revised_prompt: Option<String>,
    /// Always the adapter that ran
    pub provider: ProviderKind,
}

/// Failure taxonomy shared by all adapters
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("{env_key} is not configured")]
    ConfigMissing { env_key: &'static str },

    #[error("{0}")]
    NoImageReturned(String),

    #[error("{message}")]
    RateLimited { message: String },

    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// No HTTP status to go by: connect errors, timeouts, undecodable bodies
    #[error("{0}")]
    Transport(String),
}

impl ProviderError {
    /// Classify a non-2xx upstream answer. Identical for every provider.
    pub fn from_status(status: u16, message: String) -> Self {
        if status == 429 {
            ProviderError::RateLimited { message }
        } else {
            ProviderError::Upstream { status, message }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// Trait for image generation providers
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Generate one image. Performs exactly one outbound call.
    async fn generate_image(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError>;
}
