//! HTTP middleware and extractors for the catalog API.
//!
//! # Layer order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. CORS for the dashboard origins
//! 4. Path normalisation (trailing slashes)
//!
//! Caller identity is an extractor ([`RequireCaller`]) rather than a layer,
//! because public list/get routes share paths with guarded mutations.

pub mod auth;

pub use auth::{OptionalCaller, RequireCaller};

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

/// CORS for the dashboard UI.
///
/// With no configured origins the layer allows none, so only same-origin
/// and non-browser callers get through.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("sentry-trace"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Construction must not panic on bad input
        let _layer = cors_layer(&["https://dash.storedash.dev".into(), "bad\norigin".into()]);
    }
}
