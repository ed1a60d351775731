//! Response status taxonomy shared by the server and the dashboard client.
//!
//! The numeric codes are part of the public contract and must not change:
//! 400 malformed input, 403 no caller identity, 405 caller does not own the
//! store, 409 target row is locked, 500 anything else.

use serde::{Deserialize, Serialize};

/// Classified failure of a catalog API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input (400).
    Validation,
    /// No caller identity (403).
    Authentication,
    /// Caller does not own the target store (405).
    Authorization,
    /// Row does not exist in the store (404).
    NotFound,
    /// Target row is locked (409).
    LockConflict,
    /// Anything unclassified (500).
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Authentication => 403,
            Self::Authorization => 405,
            Self::NotFound => 404,
            Self::LockConflict => 409,
            Self::Internal => 500,
        }
    }

    /// Fixed response body for kinds that never carry a detail message.
    ///
    /// Validation errors carry the field message instead.
    #[must_use]
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::Validation => "Bad request",
            Self::Authentication => "Unauthenticated",
            Self::Authorization => "Unauthorized",
            Self::NotFound => "Not found",
            Self::LockConflict => "Conflict",
            Self::Internal => "Internal error",
        }
    }

    /// Classify a response status. Unknown failures collapse to `Internal`.
    ///
    /// Returns `None` for success statuses.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=399 => None,
            403 => Some(Self::Authentication),
            405 => Some(Self::Authorization),
            404 => Some(Self::NotFound),
            409 => Some(Self::LockConflict),
            400..=499 => Some(Self::Validation),
            _ => Some(Self::Internal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_are_stable() {
        assert_eq!(ErrorKind::Validation.status_code(), 400);
        assert_eq!(ErrorKind::Authentication.status_code(), 403);
        assert_eq!(ErrorKind::Authorization.status_code(), 405);
        assert_eq!(ErrorKind::LockConflict.status_code(), 409);
        assert_eq!(ErrorKind::Internal.status_code(), 500);
    }

    #[test]
    fn test_from_status_round_trips_known_codes() {
        for kind in [
            ErrorKind::Validation,
            ErrorKind::Authentication,
            ErrorKind::Authorization,
            ErrorKind::NotFound,
            ErrorKind::LockConflict,
            ErrorKind::Internal,
        ] {
            assert_eq!(ErrorKind::from_status(kind.status_code()), Some(kind));
        }
    }

    #[test]
    fn test_from_status_collapses_unknown() {
        assert_eq!(ErrorKind::from_status(200), None);
        assert_eq!(ErrorKind::from_status(204), None);
        assert_eq!(ErrorKind::from_status(422), Some(ErrorKind::Validation));
        assert_eq!(ErrorKind::from_status(502), Some(ErrorKind::Internal));
    }
}
