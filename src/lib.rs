//! SocialGen Gateway
//!
//! Content backend for social posts. Generates images through whichever of
//! OpenAI, Gemini or Stability AI is configured, and drafts content calendars
//! and captions with a chat-completion assistant.

pub mod api;
pub mod backend;
pub mod config;
pub mod content;
pub mod error;
pub mod middleware;
pub mod response;

pub use error::{AppError, Result};

use std::sync::Arc;

use crate::backend::{create_text_backend, ProviderRegistry, TextBackend};
use crate::config::Settings;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<Settings>,
    pub providers: Arc<ProviderRegistry>,
    /// Chat backend for the writing helpers; absent without an OpenAI key
    pub assistant: Option<Arc<dyn TextBackend>>,
}

impl AppState {
    /// Wire up the real provider adapters from configuration
    pub fn from_settings(settings: Settings) -> Self {
        let providers = Arc::new(ProviderRegistry::from_config(&settings.providers));
        let assistant = create_text_backend(&settings.providers.openai, &settings.assistant);

        Self {
            settings: Arc::new(settings),
            providers,
            assistant,
        }
    }
}
