//! Caller identity.
//!
//! Sign-in happens in an external identity provider. The only contract with
//! this service is a bearer token of the form
//! `<userId>.<hex(HMAC-SHA256(secret, userId))>`, which the provider (or
//! `sd-cli token issue`) mints with the shared `STOREDASH_AUTH_SECRET`.

mod error;

pub use error::TokenError;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use storedash_core::UserId;

type HmacSha256 = Hmac<Sha256>;

/// Issues and verifies caller tokens.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: SecretString,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl TokenVerifier {
    /// Create a verifier for the given signing key.
    #[must_use]
    pub const fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    fn mac(&self, user: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        mac.update(user.as_bytes());
        Ok(mac)
    }

    /// Mint a token for `user`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` if the user id is blank or contains a
    /// `.`, and `TokenError::InvalidKey` if the key cannot be used.
    pub fn issue(&self, user: &UserId) -> Result<String, TokenError> {
        if user.is_blank() || user.as_str().contains('.') {
            return Err(TokenError::Malformed);
        }
        let signature = hex::encode(self.mac(user.as_str())?.finalize().into_bytes());
        Ok(format!("{user}.{signature}"))
    }

    /// Verify a token and return the user id it names.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Malformed` or `TokenError::BadSignature` for
    /// tokens that do not verify.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let (user, signature) = token.trim().rsplit_once('.').ok_or(TokenError::Malformed)?;
        if user.is_empty() {
            return Err(TokenError::Malformed);
        }
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        // verify_slice compares in constant time
        self.mac(user)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        Ok(UserId::new(user))
    }

    /// Verify the value of an `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Missing` when the header is not a bearer token.
    pub fn verify_header(&self, header: &str) -> Result<UserId, TokenError> {
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(TokenError::Missing)?;
        self.verify(token)
    }
}
