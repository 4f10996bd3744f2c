//! Main entry point for the SocialGen gateway

use socialgen_gateway::{api, config::Settings, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "pretty" {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    let settings = Settings::load()?;
    settings.validate()?;
    init_tracing(&settings);

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    info!(
        environment = %settings.environment,
        production = settings.is_production(),
        "Starting SocialGen gateway"
    );

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let state = Arc::new(AppState::from_settings(settings));

    for status in state.providers.list() {
        info!(
            provider = %status.kind,
            configured = status.configured,
            env_key = status.env_key,
            "Image provider registered"
        );
    }
    match state.providers.resolve(None) {
        Some(kind) => info!(provider = %kind, "Default image provider"),
        None => warn!("No image provider configured; image generation will return 503"),
    }
    if state.assistant.is_none() {
        warn!("OPENAI_API_KEY not set; content-plan helpers will return 503");
    }
    if state.settings.auth.enabled && state.settings.auth.api_keys.is_empty() {
        warn!("Auth is enabled with no API keys; content-plan routes will reject every request");
    }

    // Build the router
    let app = api::create_router(state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
