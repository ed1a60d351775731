//! HTTP route handlers for the catalog admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Readiness (backend reachable)
//!
//! # Stores (caller required)
//! GET    /api/stores                      - Caller's stores
//! POST   /api/stores                      - Create store
//! GET    /api/stores/{storeId}            - Store detail
//! PATCH  /api/stores/{storeId}            - Rename store
//! DELETE /api/stores/{storeId}            - Delete store
//!
//! # Catalog, per {entity} in billboards, categories, subcategories,
//! # sizes, colors, products
//! GET    /api/{storeId}/{entity}          - List (public)
//! POST   /api/{storeId}/{entity}          - Create (caller required)
//! GET    /api/{storeId}/{entity}/{id}     - Detail (public)
//! PATCH  /api/{storeId}/{entity}/{id}     - Lock-guarded update
//! DELETE /api/{storeId}/{entity}/{id}     - Lock-guarded delete
//! ```

pub mod api;

use std::time::Duration;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::{Span, warn};

use crate::middleware::cors_layer;
use crate::state::AppState;

/// Build the full application with tracing, CORS and Sentry layers.
pub fn app(state: AppState, allowed_origins: &[String]) -> Router {
    routes()
        .layer(cors_layer(allowed_origins))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Build the application router (without outer layers).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(api::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog backend is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
