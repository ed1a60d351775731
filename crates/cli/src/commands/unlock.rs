//! Unlock command.
//!
//! The HTTP API refuses every write to a locked row, including one that
//! clears the flag, so unlocking is an operator action.

use storedash_admin::config::load_database_url;
use storedash_admin::db::{CatalogStore, PgCatalogStore, create_pool};
use storedash_core::EntityKind;

use super::CliError;

/// Clear `is_locked` on one row.
///
/// # Errors
///
/// Returns `CliError` if the row does not exist or the database fails.
pub async fn run(kind: EntityKind, id: &str) -> Result<(), CliError> {
    let database_url = load_database_url()?;
    let catalog = PgCatalogStore::new(create_pool(&database_url).await?);

    catalog.unlock(kind, id).await?;
    tracing::info!(kind = %kind, id = %id, "row unlocked");
    Ok(())
}
