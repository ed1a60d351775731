//! Services behind the HTTP layer.
//!
//! - `auth` - caller identity tokens (HMAC-SHA256)

pub mod auth;

pub use auth::{TokenError, TokenVerifier};
