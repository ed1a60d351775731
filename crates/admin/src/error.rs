//! Unified error handling for the catalog API.
//!
//! Every failure leaves a handler as an [`AppError`]. Status codes and the
//! fixed response bodies come from [`ErrorKind`], so the server and the
//! dashboard client classify responses the same way.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use storedash_core::ErrorKind;

use crate::db::RepositoryError;
use crate::models::ValidationError;

/// Application-level error type for the catalog API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input. The message is returned verbatim.
    #[error("Bad request: {0}")]
    BadRequest(&'static str),

    /// No verifiable caller identity.
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Caller does not own the store in the path.
    #[error("Unauthorized")]
    Unauthorized,

    /// Row does not exist in the path store.
    #[error("Not found")]
    NotFound,

    /// Target row is locked.
    #[error("Conflict")]
    Locked,

    /// Anything else, tagged with the route that failed.
    #[error("[{route}] {source}")]
    Internal {
        route: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl AppError {
    /// The status class of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::Validation,
            Self::Unauthenticated => ErrorKind::Authentication,
            Self::Unauthorized => ErrorKind::Authorization,
            Self::NotFound => ErrorKind::NotFound,
            Self::Locked => ErrorKind::LockConflict,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Classify a repository failure for `route`.
    #[must_use]
    pub fn repository(route: &'static str, source: RepositoryError) -> Self {
        match source {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Locked => Self::Locked,
            RepositoryError::InvalidReference(kind) => {
                Self::BadRequest(kind.invalid_reference_message())
            }
            source => Self::Internal { route, source },
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.message())
    }
}

/// Attach a route tag to repository results.
pub trait RouteContext<T> {
    /// Convert the error side into an [`AppError`] tagged with `route`.
    ///
    /// # Errors
    ///
    /// Returns the classified error when `self` is `Err`.
    fn at(self, route: &'static str) -> Result<T, AppError>;
}

impl<T> RouteContext<T> for Result<T, RepositoryError> {
    fn at(self, route: &'static str) -> Result<T, AppError> {
        self.map_err(|e| AppError::repository(route, e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal { route, source } = &self {
            let event_id = sentry::capture_error(source);
            tracing::error!(
                route = %route,
                error = %source,
                sentry_event_id = %event_id,
                "catalog request failed"
            );
        }

        let kind = self.kind();
        let status = StatusCode::from_u16(kind.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Internal details never reach the client
        let body = match &self {
            Self::BadRequest(message) => *message,
            _ => kind.public_message(),
        };

        (status, body).into_response()
    }
}

/// Set the Sentry user context from a caller id.
pub fn set_sentry_user(user_id: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_owned()),
            ..Default::default()
        }));
    });
}
