//! JSON extractor whose rejections use the response envelope

use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::error::AppError;

/// Like `axum::Json`, but a malformed body becomes a 400 envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}
