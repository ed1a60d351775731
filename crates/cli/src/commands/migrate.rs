//! Database migration command.
//!
//! # Environment Variables
//!
//! - `STOREDASH_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string
//!
//! Migrations live in `crates/admin/migrations/` and are embedded at
//! compile time.

use storedash_admin::config::load_database_url;
use storedash_admin::db::create_pool;

use super::CliError;

/// Run the catalog migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = load_database_url()?;

    tracing::info!("Connecting to catalog database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running catalog migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Catalog migrations complete!");
    Ok(())
}
