//! Application error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::backend::ProviderError;
use crate::response::envelope::Envelope;

pub type Result<T> = std::result::Result<T, AppError>;

/// Message returned when an upstream provider throttles us.
pub const RATE_LIMIT_MESSAGE: &str = "Rate limit or quota exceeded. Wait a minute and retry. \
     See platform.stability.ai or ai.google.dev for limits.";

/// Errors surfaced by the HTTP layer
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A request field failed validation
    #[error("{reason}")]
    Validation { field: &'static str, reason: String },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// A required service has no credentials
    #[error("{0}")]
    NotConfigured(String),

    /// A dependency answered but gave us nothing usable
    #[error("{0}")]
    Unavailable(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NotConfigured(_) | AppError::Unavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Provider(err) => provider_status(err),
            AppError::Config(_) | AppError::HttpClient(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to hand back to a client
    pub fn user_message(&self) -> String {
        match self {
            AppError::Provider(ProviderError::ConfigMissing { .. }) => {
                "Image generation is not configured".to_string()
            }
            AppError::Provider(ProviderError::RateLimited { .. }) => RATE_LIMIT_MESSAGE.to_string(),
            AppError::Config(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

fn provider_status(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::ConfigMissing { .. } => StatusCode::SERVICE_UNAVAILABLE,
        ProviderError::NoImageReturned(_) => StatusCode::BAD_GATEWAY,
        ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ProviderError::Upstream { status, .. } => match StatusCode::from_u16(*status) {
            Ok(code) if code.is_client_error() => code,
            _ => StatusCode::BAD_GATEWAY,
        },
        ProviderError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Config(_) | AppError::HttpClient(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Internal service error");
            }
            AppError::Provider(ProviderError::Transport(_)) => {
                tracing::error!(error = %self, "Upstream transport failure");
            }
            AppError::Provider(_) | AppError::Unavailable(_) | AppError::NotConfigured(_) => {
                tracing::warn!(status = status.as_u16(), error = %self, "Upstream error");
            }
            AppError::Validation { field, .. } => {
                tracing::debug!(field, error = %self, "Validation failed");
            }
            _ => {
                tracing::debug!(error = %self, "Client error");
            }
        }

        Envelope::error(status, self.user_message()).into_response()
    }
}
