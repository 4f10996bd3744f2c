//! Configuration module

pub mod settings;

pub use settings::{
    AssistantConfig, AuthConfig, CorsConfig, LoggingConfig, ProviderConfig, ProvidersConfig,
    ServerConfig, Settings,
};
