//! Lazily constructed, process-wide HTTP client per provider

use reqwest::Client;
use serde_json::Value;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

use crate::backend::traits::{ProviderError, ProviderKind};
use crate::config::ProviderConfig;

/// Credentials plus an HTTP client built on first use.
///
/// A missing key is reported on every call, not at start-up. Two requests
/// racing on first use may both build a client; the loser's copy is dropped.
pub struct LazyClient {
    kind: ProviderKind,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    client: OnceLock<Client>,
}

impl LazyClient {
    pub fn new(kind: ProviderKind, config: &ProviderConfig) -> Self {
        Self {
            kind,
            api_key: config.key().map(str::to_string),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
            client: OnceLock::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_initialized(&self) -> bool {
        self.client.get().is_some()
    }

    /// The client and key, or `ConfigMissing`
    pub fn get(&self) -> Result<(&Client, &str), ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::ConfigMissing {
            env_key: self.kind.env_key(),
        })?;

        if let Some(client) = self.client.get() {
            return Ok((client, api_key));
        }

        let built = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProviderError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        let _ = self.client.set(built);
        debug!(provider = %self.kind, "Initialized provider client");

        let client = self
            .client
            .get()
            .ok_or_else(|| ProviderError::Transport("HTTP client unavailable".to_string()))?;
        Ok((client, api_key))
    }
}

/// Read the body of a failed response and classify it.
///
/// `extract` pulls the provider's message out of its JSON error body;
/// `fallback` builds one from the status when the body is not JSON or
/// carries no message.
pub async fn failure_from_response<F, D>(
    response: reqwest::Response,
    extract: F,
    fallback: D,
) -> ProviderError
where
    F: FnOnce(&Value) -> Option<String>,
    D: FnOnce(u16) -> String,
{
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(extract)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback(status));

    ProviderError::from_status(status, message)
}

/// Status-only message for providers without a documented error shape
pub fn status_message(status: u16) -> String {
    format!("Upstream returned status {}", status)
}

/// `{"error": {"message": ...}}`, the shape OpenAI and Google both use
pub fn nested_error_message(body: &Value) -> Option<String> {
    body.get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
