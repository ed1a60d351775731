//! Command implementations.

pub mod migrate;
pub mod store;
pub mod token;
pub mod unlock;

use thiserror::Error;

use storedash_admin::config::ConfigError;
use storedash_admin::db::RepositoryError;
use storedash_admin::models::ValidationError;
use storedash_admin::services::TokenError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}
