//! Caller token error types.

use thiserror::Error;

/// Errors that can occur while verifying a caller token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// No `Authorization: Bearer` header on the request.
    #[error("missing bearer token")]
    Missing,

    /// Token is not `<userId>.<signature>`.
    #[error("malformed token")]
    Malformed,

    /// Signature does not match the user id.
    #[error("signature mismatch")]
    BadSignature,

    /// The signing key could not be used.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}
