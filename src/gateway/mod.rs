//! Axum-based HTTP gateway for the analysis service.
//!
//! Wraps the router in a CORS allowlist, a request body limit sized for
//! multipart image uploads, and a request timeout.

mod handlers;

use handlers::{handle_analyze, handle_health, handle_root};

use crate::analysis::AnalysisService;
use crate::config::{Config, GatewayConfig};
use anyhow::Result;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AnalysisService>,
}

/// Assemble the routes and middleware.
pub fn build_router(state: AppState, gateway: &GatewayConfig) -> Router {
    let max_body = gateway.max_body_bytes();

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/analyze", post(handle_analyze))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body))
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(gateway.request_timeout_secs),
        ))
        .layer(cors_layer(&gateway.allowed_origins))
}

/// Credentials are allowed, so methods and headers are mirrored from the
/// preflight instead of using wildcards.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = origin.as_str(), "Ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Run the HTTP gateway until Ctrl-C.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let service = Arc::new(AnalysisService::from_config(&config));

    println!("◆ Character Checker listening on http://{host}:{actual_port}");
    println!("  GET  /        → status");
    println!("  GET  /health  → health check");
    println!("  POST /analyze → consistency check (multipart field `files`)");
    println!("  models: {}", service.models().join(", "));
    if !service.vision_configured() {
        println!("  ! No Gemini API key set; reports will be color analysis only");
        println!("    Set GEMINI_API_KEY or GOOGLE_API_KEY, or [vision] api_key in config.toml");
    }
    println!("  Press Ctrl+C to stop.\n");

    let app = build_router(AppState { service }, &config.gateway);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Ctrl-C handler failed: {e}");
            }
        })
        .await?;

    Ok(())
}
