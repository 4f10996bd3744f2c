//! Unit tests for configuration module

use socialgen_gateway::config::Settings;
use std::collections::HashMap;
use std::io::Write;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_default_settings() {
    let settings = Settings::default();

    assert_eq!(settings.server.host, "0.0.0.0");
    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.environment, "development");
    assert!(settings.auth.enabled);
    assert!(settings.auth.api_keys.is_empty());
    assert_eq!(settings.cors.allowed_origins, vec!["http://localhost:5173"]);
    assert_eq!(settings.assistant.model, "gpt-4o-mini");
    assert_eq!(settings.providers.openai.model, "dall-e-3");
    assert_eq!(settings.providers.gemini.model, "gemini-2.5-flash-image");
    assert_eq!(settings.providers.stability.model, "stable-diffusion-xl-1024-v1-0");
    assert_eq!(settings.providers.stability.timeout_ms, 120_000);
    assert!(!settings.providers.openai.is_configured());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_provider_keys_from_environment() {
    let mut settings = Settings::default();
    settings.apply_env(lookup(&[
        ("GEMINI_API_KEY", "g-key"),
        ("STABILITY_API_KEY", "   "),
        ("PORT", "8080"),
    ]));

    assert_eq!(settings.providers.gemini.key(), Some("g-key"));
    assert!(!settings.providers.stability.is_configured());
    assert!(!settings.providers.openai.is_configured());
    assert_eq!(settings.server.port, 8080);
}

#[test]
fn test_app_env_wins_over_node_env() {
    let mut settings = Settings::default();
    settings.apply_env(lookup(&[("NODE_ENV", "production")]));
    assert!(settings.is_production());

    let mut settings = Settings::default();
    settings.apply_env(lookup(&[("NODE_ENV", "production"), ("APP_ENV", "staging")]));
    assert_eq!(settings.environment, "staging");
}

#[test]
fn test_unparseable_port_is_ignored() {
    let mut settings = Settings::default();
    settings.apply_env(lookup(&[("PORT", "eighty")]));
    assert_eq!(settings.server.port, 3000);
}

#[test]
fn test_load_yaml_file() {
    let file = write_config(
        ".yaml",
        r#"
auth:
  enabled: false
  api_keys: ["alpha", "beta"]
cors:
  allowed_origins: ["https://app.example.com"]
providers:
  gemini:
    model: gemini-custom
    timeout_ms: 5000
assistant:
  temperature: 0.2
"#,
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert!(!settings.auth.enabled);
    assert_eq!(settings.auth.api_keys, vec!["alpha", "beta"]);
    assert_eq!(settings.cors.allowed_origins, vec!["https://app.example.com"]);
    assert_eq!(settings.providers.gemini.model, "gemini-custom");
    assert_eq!(settings.providers.gemini.timeout_ms, 5000);
    // untouched providers keep their defaults
    assert_eq!(settings.providers.gemini.base_url, "https://generativelanguage.googleapis.com/v1beta");
    assert_eq!(settings.providers.openai.model, "dall-e-3");
    assert!((settings.assistant.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(settings.assistant.model, "gpt-4o-mini");
}

#[test]
fn test_load_toml_file() {
    let file = write_config(
        ".toml",
        r#"
[providers.stability]
base_url = "http://127.0.0.1:9999"
model = "sd3"
"#,
    );

    let settings = Settings::load_from_path(file.path()).unwrap();

    assert_eq!(settings.providers.stability.base_url, "http://127.0.0.1:9999");
    assert_eq!(settings.providers.stability.model, "sd3");
    assert_eq!(settings.providers.stability.timeout_ms, 120_000);
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::load_from_path(dir.path().join("absent.yaml")).unwrap();

    assert_eq!(settings.providers.openai.base_url, "https://api.openai.com/v1");
    assert_eq!(settings.logging.level, "info");
}

#[test]
fn test_settings_validation_invalid_port() {
    let mut settings = Settings::default();
    settings.server.port = 0;
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_invalid_base_url() {
    let mut settings = Settings::default();
    settings.providers.openai.base_url = "not a url".to_string();

    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("openai"));
}

#[test]
fn test_settings_validation_empty_model() {
    let mut settings = Settings::default();
    settings.providers.stability.model = "  ".to_string();
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validation_zero_timeout() {
    let mut settings = Settings::default();
    settings.providers.gemini.timeout_ms = 0;
    assert!(settings.validate().is_err());
}
