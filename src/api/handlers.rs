//! HTTP request handlers

use crate::api::extract::ApiJson;
use crate::api::models::{
    GenerateImageRequest, GenerateImageResponse, HealthResponse, HomeResponse, ProviderInfo,
    ProviderListResponse,
};
use crate::backend::GenerationRequest;
use crate::error::AppError;
use crate::response::{ApiResponse, Envelope};
use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Longest prompt accepted after trimming, in UTF-16 code units (what browsers count)
pub const MAX_PROMPT_LENGTH: usize = 4000;

pub const NO_PROVIDER_MESSAGE: &str = "No image provider configured. \
     Set STABILITY_API_KEY, GEMINI_API_KEY, or OPENAI_API_KEY in .env";

/// Check the prompt and return it trimmed
pub fn validate_prompt(prompt: Option<&str>) -> Result<String, AppError> {
    let Some(prompt) = prompt else {
        return Err(AppError::validation("prompt", "Prompt is required"));
    };
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("prompt", "Prompt cannot be empty"));
    }
    if trimmed.encode_utf16().count() > MAX_PROMPT_LENGTH {
        return Err(AppError::validation(
            "prompt",
            format!("Prompt must be at most {} characters", MAX_PROMPT_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}

/// Generate an image with the requested or first configured provider
#[utoipa::path(
    post,
    path = "/api/images/generate",
    tag = "Images",
    request_body = GenerateImageRequest,
    responses(
        (status = 200, description = "Image generated", body = GenerateImageResponse),
        (status = 400, description = "Invalid prompt or body"),
        (status = 429, description = "Provider rate limit or quota exceeded"),
        (status = 502, description = "Provider returned no image"),
        (status = 503, description = "No provider configured"),
    )
)]
pub async fn generate_image(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<GenerateImageRequest>,
) -> Result<ApiResponse<GenerateImageResponse>, AppError> {
    let request_id = Uuid::new_v4();
    let prompt = validate_prompt(request.prompt_str())?;

    let requested = request.provider_str();
    let Some(kind) = state.providers.resolve(requested) else {
        warn!(%request_id, "Image generation requested but no provider is configured");
        return Err(AppError::NotConfigured(NO_PROVIDER_MESSAGE.to_string()));
    };
    let Some(adapter) = state.providers.get(kind) else {
        return Err(AppError::NotConfigured(NO_PROVIDER_MESSAGE.to_string()));
    };

    info!(
        %request_id,
        provider = %kind,
        requested = requested.unwrap_or("auto"),
        prompt_chars = prompt.chars().count(),
        "Received image generation request"
    );

    let generation = GenerationRequest::new(prompt).with_options(request.options());
    let result = adapter.generate_image(&generation).await.map_err(|err| {
        warn!(%request_id, provider = %kind, error = %err, "Image generation failed");
        AppError::from(err)
    })?;

    info!(
        %request_id,
        provider = %result.provider,
        hosted = result.image.is_url(),
        "Image generation completed"
    );

    Ok(Envelope::ok(GenerateImageResponse::from(result)))
}

/// List image providers with their configuration state
#[utoipa::path(
    get,
    path = "/api/images/providers",
    tag = "Images",
    responses((status = 200, description = "Provider listing", body = ProviderListResponse))
)]
pub async fn list_providers(
    State(state): State<Arc<AppState>>,
) -> ApiResponse<ProviderListResponse> {
    let providers = state
        .providers
        .list()
        .into_iter()
        .map(ProviderInfo::from)
        .collect();

    Envelope::ok(ProviderListResponse {
        providers,
        default_provider: state.providers.resolve(None),
    })
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Server is running", body = HomeResponse))
)]
pub async fn index(State(state): State<Arc<AppState>>) -> ApiResponse<HomeResponse> {
    Envelope::ok(HomeResponse {
        message: "Server is running".to_string(),
        environment: state.settings.environment.clone(),
    })
}

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResponse<HealthResponse> {
    Envelope::ok(HealthResponse {
        status: "ok".to_string(),
        env: state.settings.environment.clone(),
    })
}

/// Fallback for unknown routes
pub async fn not_found() -> Envelope<()> {
    Envelope::error(StatusCode::NOT_FOUND, "Not found")
}
