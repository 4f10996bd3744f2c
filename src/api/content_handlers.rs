//! Writing-assistant handlers: content calendar and caption polishing

use crate::api::extract::ApiJson;
use crate::api::models::{
    ContentPlanRequest, ContentPlanResponse, PolishCaptionRequest, PolishCaptionResponse,
};
use crate::backend::{ChatCompletionRequest, ChatMessage, TextBackend};
use crate::content::plan::{self, PlanParameters};
use crate::content::{prepare_description, CAPTION_SYSTEM_PROMPT};
use crate::error::AppError;
use crate::response::{ApiResponse, Envelope};
use crate::AppState;
use axum::extract::State;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

pub const ASSISTANT_NOT_CONFIGURED: &str = "AI service not configured. Set OPENAI_API_KEY.";
pub const NO_AI_RESPONSE: &str = "No response from AI";

fn assistant(state: &AppState) -> Result<Arc<dyn TextBackend>, AppError> {
    state
        .assistant
        .clone()
        .ok_or_else(|| AppError::NotConfigured(ASSISTANT_NOT_CONFIGURED.to_string()))
}

/// Send one system + user exchange and return the reply text
async fn complete(
    backend: &dyn TextBackend,
    system: String,
    user: String,
) -> Result<String, AppError> {
    let request = ChatCompletionRequest {
        model: backend.default_model().to_string(),
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        temperature: Some(backend.temperature()),
    };

    let response = backend.chat_completion(request).await.map_err(|err| {
        error!(error = %err, "Chat completion failed");
        AppError::Internal(err.to_string())
    })?;

    response
        .first_content()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| AppError::Unavailable(NO_AI_RESPONSE.to_string()))
}

/// Draft a day-by-day content calendar
#[utoipa::path(
    post,
    path = "/api/content-plan/generate",
    tag = "Content",
    request_body = ContentPlanRequest,
    responses(
        (status = 200, description = "Planned ideas", body = ContentPlanResponse),
        (status = 401, description = "Missing or unknown API key"),
        (status = 503, description = "Assistant not configured or silent"),
    ),
    security(("api_key" = []))
)]
pub async fn generate_plan(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ContentPlanRequest>,
) -> Result<ApiResponse<ContentPlanResponse>, AppError> {
    let backend = assistant(&state)?;

    let start = match request.start_date.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => plan::parse_start_date(raw)
            .ok_or_else(|| AppError::validation("startDate", "Invalid startDate"))?,
        _ => Utc::now().date_naive(),
    };
    let days = plan::plan_length(request.duration.as_ref());

    let params = PlanParameters {
        goal: non_blank(request.goal.as_deref()).unwrap_or("Branding").to_string(),
        niche: non_blank(request.niche.as_deref()).unwrap_or("General").to_string(),
        platforms: request.platform_names(),
        dates: plan::plan_dates(start, days),
    };

    info!(
        days,
        goal = %params.goal,
        platforms = %params.platform_list(),
        "Generating content plan"
    );

    let reply = complete(backend.as_ref(), params.system_prompt(), params.user_prompt()).await?;

    let ideas = plan::parse_ideas(&reply).map_err(|err| {
        error!(error = %err, "Content plan reply was not valid JSON");
        AppError::Internal(err.to_string())
    })?;
    let ideas = plan::normalize_ideas(ideas, &params);

    info!(ideas = ideas.len(), "Content plan generated");
    Ok(Envelope::ok(ContentPlanResponse { ideas }))
}

/// Turn a short description into a finished caption
#[utoipa::path(
    post,
    path = "/api/content-plan/polish-caption",
    tag = "Content",
    request_body = PolishCaptionRequest,
    responses(
        (status = 200, description = "Polished caption", body = PolishCaptionResponse),
        (status = 400, description = "Description too short"),
        (status = 401, description = "Missing or unknown API key"),
        (status = 503, description = "Assistant not configured or silent"),
    ),
    security(("api_key" = []))
)]
pub async fn polish_caption(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<PolishCaptionRequest>,
) -> Result<ApiResponse<PolishCaptionResponse>, AppError> {
    let description = request
        .description
        .as_ref()
        .and_then(|value| value.as_str())
        .and_then(prepare_description)
        .ok_or_else(|| {
            AppError::validation("description", "Description must be at least 5 characters")
        })?;

    let backend = assistant(&state)?;
    let caption = complete(backend.as_ref(), CAPTION_SYSTEM_PROMPT.to_string(), description).await?;

    Ok(Envelope::ok(PolishCaptionResponse { caption }))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
