//! Caller identity extractors.
//!
//! Identity comes from an `Authorization: Bearer <token>` header verified
//! with [`TokenVerifier`](crate::services::auth::TokenVerifier). Handlers
//! that mutate the catalog take [`RequireCaller`] as their first argument so
//! the 403 is decided before the request body is looked at.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use storedash_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a verified caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireCaller(user): RequireCaller) -> String {
///     format!("Hello, {user}!")
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireCaller(pub UserId);

impl FromRequestParts<AppState> for RequireCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let OptionalCaller(caller) = OptionalCaller::from_request_parts(parts, state)
            .await
            .unwrap_or(OptionalCaller(None));

        caller.map(Self).ok_or(AppError::Unauthenticated)
    }
}

/// Extractor that gets the caller if the request carries a valid token.
#[derive(Debug, Clone)]
pub struct OptionalCaller(pub Option<UserId>);

impl FromRequestParts<AppState> for OptionalCaller {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header) = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(Self(None));
        };

        match state.tokens().verify_header(header) {
            Ok(user) => {
                set_sentry_user(user.as_str());
                Ok(Self(Some(user)))
            }
            Err(e) => {
                debug!(error = %e, "rejected caller token");
                Ok(Self(None))
            }
        }
    }
}
