//! # tagdb HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Owner, element count, indexed tag count
//! - `POST /query` - Execute a raw query string
//! - `GET /elements/{key}` - Snapshot of one element
//! - `GET /tags/{tag}` - Keys carrying a tag
//!
//! ## Security Configuration
//!
//! - `http.cors_origins`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `http.rate_limit`: Requests per second (default: 100, 0 to disable)
//! - `TAGDB_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{ApiKey, keys_match};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use types::{
    ElementResponse, HealthResponse, QueryRequest, QueryResponse, StatusResponse, TagResponse,
};

use crate::config::HttpConfig;
pub use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::future::Future;
use tagdb_core::TagDbError;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit. Queries are far smaller than this.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Origins allowed when `http.cors_origins` is empty or unusable.
const LOCALHOST_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:8080",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:8080",
];

/// Build the CORS layer from `http.cors_origins`: `"*"` allows any origin,
/// an empty value allows localhost only, anything else is a comma list.
fn build_cors_layer(origins: &str) -> CorsLayer {
    let origins = origins.trim();
    if origins == "*" {
        tracing::warn!("CORS: any origin may call the API");
        return CorsLayer::permissive();
    }

    let mut allowed = parse_origins(origins.split(','));
    if allowed.is_empty() {
        tracing::info!("CORS: localhost origins only");
        allowed = parse_origins(LOCALHOST_ORIGINS);
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Parse origins into header values, skipping blanks and logging the rest
/// that fail to parse.
fn parse_origins<'a>(origins: impl IntoIterator<Item = &'a str>) -> Vec<HeaderValue> {
    origins
        .into_iter()
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, "CORS: ignoring invalid origin: {}", e);
                None
            }
        })
        .collect()
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState, settings: &HttpConfig) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/query", post(handlers::query_handler))
        .route("/elements/{key}", get(handlers::element_handler))
        .route("/tags/{tag}", get(handlers::tag_handler));

    // Authentication is innermost: it runs last on the request path.
    match settings.api_key.as_deref() {
        Some(key) => {
            tracing::info!("API key authentication enabled");
            let key: ApiKey = key.into();
            router = router.layer(axum_middleware::from_fn_with_state(
                key,
                auth::api_key_auth_middleware,
            ));
        }
        None => {
            tracing::warn!(
                "API key authentication DISABLED - all endpoints are publicly accessible! \
                 Set TAGDB_API_KEY to enable authentication."
            );
        }
    }

    match create_rate_limiter(settings.rate_limit) {
        Some(limiter) => {
            tracing::info!("Rate limiting enabled: {} requests/second", settings.rate_limit);
            router = router.layer(axum_middleware::from_fn_with_state(
                limiter,
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer(&settings.cors_origins))
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Serve the HTTP API until `shutdown` completes.
pub async fn run_server<F>(
    addr: &str,
    state: AppState,
    settings: &HttpConfig,
    shutdown: F,
) -> Result<(), TagDbError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state, settings);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TagDbError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("tagdb HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TagDbError::IoError(format!("Server error: {}", e)))
}
