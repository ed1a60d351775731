//! Storedash CLI - migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog database migrations
//! sd-cli migrate
//!
//! # Mint a caller token for a user
//! sd-cli token issue --user user_2abc
//!
//! # Create a store owned by a user
//! sd-cli store create --user user_2abc --name "Main Store"
//!
//! # Clear the lock flag on one row
//! sd-cli unlock billboard 6f1c...
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `token issue` - Print a bearer token for a user
//! - `store create` - Create a store
//! - `unlock` - Unlock a catalog row (the API cannot do this)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use storedash_core::EntityKind;

mod commands;

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Storedash CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run catalog database migrations
    Migrate,
    /// Manage caller tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Manage stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Clear the lock flag on a catalog row
    Unlock {
        /// Entity kind (billboard, category, subcategory, size, color, product)
        entity: EntityKind,

        /// Row id
        id: String,
    },
}

#[derive(Subcommand)]
enum TokenAction {
    /// Print a bearer token for a user
    Issue {
        /// User id from the authentication provider
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Create a store owned by a user
    Create {
        /// Owner's user id
        #[arg(short, long)]
        user: String,

        /// Store name
        #[arg(short, long)]
        name: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Token { action } => match action {
            TokenAction::Issue { user } => commands::token::issue(&user)?,
        },
        Commands::Store { action } => match action {
            StoreAction::Create { user, name } => {
                commands::store::create(&user, &name).await?;
            }
        },
        Commands::Unlock { entity, id } => commands::unlock::run(entity, &id).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_unlock() {
        let cli = Cli::try_parse_from(["sd-cli", "unlock", "billboards", "bb1"]).unwrap_or_else(
            |e| panic!("{e}"),
        );
        assert!(matches!(
            cli.command,
            Commands::Unlock { entity: EntityKind::Billboard, ref id } if id == "bb1"
        ));
    }

    #[test]
    fn test_parse_store_create() {
        let cli = Cli::try_parse_from(["sd-cli", "store", "create", "-u", "user1", "-n", "Main"])
            .unwrap_or_else(|e| panic!("{e}"));
        assert!(matches!(
            cli.command,
            Commands::Store {
                action: StoreAction::Create { ref user, ref name }
            } if user == "user1" && name == "Main"
        ));
    }

    #[test]
    fn test_rejects_unknown_entity() {
        assert!(Cli::try_parse_from(["sd-cli", "unlock", "stores", "s1"]).is_err());
    }
}
