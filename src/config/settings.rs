//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_environment() -> String {
    "development".to_string()
}

/// Cross-origin settings for the browser frontend
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:5173".to_string()]
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

/// Authentication configuration for the protected assistant routes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub api_keys: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Connection settings for one image provider
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_timeout() -> u64 {
    120_000
}

impl ProviderConfig {
    /// True when a non-empty key is present
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().map_or(false, |k| !k.trim().is_empty())
    }

    /// The key, with empty values treated as absent
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

/// Per-provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_openai")]
    pub openai: ProviderConfig,
    #[serde(default = "default_gemini")]
    pub gemini: ProviderConfig,
    #[serde(default = "default_stability")]
    pub stability: ProviderConfig,
}

fn default_openai() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://api.openai.com/v1".to_string(),
        model: "dall-e-3".to_string(),
        timeout_ms: default_timeout(),
    }
}

fn default_gemini() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        model: "gemini-2.5-flash-image".to_string(),
        timeout_ms: default_timeout(),
    }
}

fn default_stability() -> ProviderConfig {
    ProviderConfig {
        api_key: None,
        base_url: "https://api.stability.ai".to_string(),
        model: "stable-diffusion-xl-1024-v1-0".to_string(),
        timeout_ms: default_timeout(),
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: default_openai(),
            gemini: default_gemini(),
            stability: default_stability(),
        }
    }
}

/// Chat model used by the writing helpers. Shares the OpenAI key and base URL.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_assistant_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_assistant_model(),
            temperature: default_temperature(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/socialgen.yaml")
    }

    /// Load settings from a YAML or TOML file (optional) plus environment overrides
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let format = if path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            FileFormat::Yaml
        } else {
            FileFormat::Toml
        };

        let mut config_builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("environment", "development")?
            .set_default("auth.enabled", true)?
            .set_default("auth.api_keys", Vec::<String>::new())?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?;

        let defaults = ProvidersConfig::default();
        for (name, provider) in [
            ("openai", &defaults.openai),
            ("gemini", &defaults.gemini),
            ("stability", &defaults.stability),
        ] {
            config_builder = config_builder
                .set_default(format!("providers.{}.base_url", name), provider.base_url.clone())?
                .set_default(format!("providers.{}.model", name), provider.model.clone())?
                .set_default(format!("providers.{}.timeout_ms", name), provider.timeout_ms)?;
        }

        if path.exists() {
            config_builder = config_builder.add_source(File::from(path).format(format));
        }

        config_builder = config_builder.add_source(
            Environment::with_prefix("SOCIALGEN")
                .separator("__")
                .try_parsing(true),
        );

        let config = config_builder.build()?;
        let mut settings: Settings = config.try_deserialize()?;
        settings.apply_env(|name| std::env::var(name).ok());

        Ok(settings)
    }

    /// Apply the conventional unprefixed variables (`OPENAI_API_KEY`, `PORT`, ...).
    ///
    /// Takes a lookup function so the behaviour can be exercised without
    /// touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.providers.openai.api_key = Some(key);
        }
        if let Some(key) = non_empty("GEMINI_API_KEY") {
            self.providers.gemini.api_key = Some(key);
        }
        if let Some(key) = non_empty("STABILITY_API_KEY") {
            self.providers.stability.api_key = Some(key);
        }
        if let Some(port) = non_empty("PORT").and_then(|p| p.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(env) = non_empty("APP_ENV").or_else(|| non_empty("NODE_ENV")) {
            self.environment = env;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        let providers = [
            ("openai", &self.providers.openai),
            ("gemini", &self.providers.gemini),
            ("stability", &self.providers.stability),
        ];
        for (name, provider) in providers {
            if reqwest::Url::parse(&provider.base_url).is_err() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Provider '{}' has an invalid base_url: '{}'",
                    name, provider.base_url
                ))));
            }
            if provider.model.trim().is_empty() {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Provider '{}' must name a model",
                    name
                ))));
            }
            if provider.timeout_ms == 0 {
                return Err(AppError::Config(config::ConfigError::Message(format!(
                    "Provider '{}' timeout_ms cannot be 0",
                    name
                ))));
            }
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
            },
            environment: default_environment(),
            cors: CorsConfig::default(),
            auth: AuthConfig {
                enabled: true,
                api_keys: vec![],
            },
            providers: ProvidersConfig::default(),
            assistant: AssistantConfig::default(),
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}
