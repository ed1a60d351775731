//! Caller token command.
//!
//! Tokens are signed with `STOREDASH_AUTH_SECRET`, the same key the server
//! verifies with.

use storedash_admin::config::load_auth_secret;
use storedash_admin::services::TokenVerifier;
use storedash_core::UserId;

use super::CliError;

/// Print a bearer token for `user`.
///
/// # Errors
///
/// Returns `CliError` if the secret is missing or weak, or the user id is
/// not signable.
pub fn issue(user: &str) -> Result<(), CliError> {
    let verifier = TokenVerifier::new(load_auth_secret()?);
    let token = verifier.issue(&UserId::new(user))?;

    tracing::info!(user_id = %user, "issued caller token");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }
    Ok(())
}
