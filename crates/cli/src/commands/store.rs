//! Store management command.

use storedash_admin::config::load_database_url;
use storedash_admin::db::{CatalogStore, PgCatalogStore, create_pool};
use storedash_admin::models::{StoreInput, Validate};
use storedash_core::UserId;

use super::CliError;

/// Create a store owned by `user` and print its id.
///
/// # Errors
///
/// Returns `CliError` for a blank name or a database failure.
pub async fn create(user: &str, name: &str) -> Result<(), CliError> {
    let draft = StoreInput {
        name: Some(name.to_owned()),
    }
    .validate()?;

    let database_url = load_database_url()?;
    let catalog = PgCatalogStore::new(create_pool(&database_url).await?);

    let store = catalog.create_store(&UserId::new(user), &draft).await?;
    tracing::info!(store_id = %store.id, user_id = %user, "store created");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", store.id);
    }
    Ok(())
}
