//! HTTP route definitions

use crate::api::models::*;
use crate::api::{content_handlers, handlers};
use crate::backend::{Capabilities, ProviderKind};
use crate::content::{ContentIdea, PostType};
use crate::middleware::require_api_key;
use crate::response::Envelope;
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SocialGen API",
        description = "Content backend for social posts: image generation across providers and AI writing helpers.",
        license(name = "MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        handlers::generate_image,
        handlers::list_providers,
        handlers::index,
        handlers::health_check,
        content_handlers::generate_plan,
        content_handlers::polish_caption,
    ),
    components(schemas(
        GenerateImageRequest,
        GenerateImageResponse,
        ProviderInfo,
        ProviderListResponse,
        ProviderKind,
        Capabilities,
        HomeResponse,
        HealthResponse,
        ContentPlanRequest,
        ContentPlanResponse,
        ContentIdea,
        PostType,
        PolishCaptionRequest,
        PolishCaptionResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Images", description = "Image generation endpoints"),
        (name = "Content", description = "Content calendar and caption helpers"),
        (name = "Health", description = "Health and monitoring endpoints"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    // credentials forbid the wildcard origin
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Last-resort handler: a panicking request gets a 500 envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        *s
    } else {
        "unknown panic"
    };
    error!(panic = %detail, "Request handler panicked");

    Envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // Assistant routes sit behind the API-key guard
    let content_routes = Router::new()
        .route("/generate", post(content_handlers::generate_plan))
        .route("/polish-caption", post(content_handlers::polish_caption))
        .route_layer(from_fn_with_state(state.clone(), require_api_key));

    let cors = cors_layer(&state.settings.cors.allowed_origins);

    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health_check))
        .route("/api/images/generate", post(handlers::generate_image))
        .route("/api/images/providers", get(handlers::list_providers))
        .nest("/api/content-plan", content_routes)
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
