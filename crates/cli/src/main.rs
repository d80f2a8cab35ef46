//! AbaMade CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply storefront migrations (and the session store schema)
//! aba-cli migrate
//!
//! # Insert the demo catalog into an empty database
//! aba-cli seed
//!
//! # Give an existing account back-office access
//! aba-cli admin promote -e admin@example.com
//!
//! # Create an admin account with a generated temporary password
//! aba-cli admin create -e admin@example.com --first-name Ada
//!
//! # Delete anonymous cart lines idle for longer than the session expiry
//! aba-cli cart prune
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use abamade_storefront::middleware::session::SESSION_EXPIRY_DAYS;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aba-cli")]
#[command(author, version, about = "AbaMade CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the demo catalog (skipped when categories already exist)
    Seed {
        /// Apply migrations first
        #[arg(long)]
        migrate: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Maintain stored carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Delete anonymous cart lines left idle
    Prune {
        /// Minimum idle age in days
        #[arg(long, default_value_t = SESSION_EXPIRY_DAYS,
              value_parser = clap::value_parser!(i32).range(1..))]
        older_than_days: i32,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role to an existing account
    Promote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Revoke the admin role
    Demote {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Create a new admin account with a temporary password
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(long)]
        first_name: Option<String>,

        /// Last name
        #[arg(long)]
        last_name: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { migrate } => {
            if migrate {
                commands::migrate::run().await?;
            }
            commands::seed::run().await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Promote { email } => {
                commands::admin::set_admin(&email, true).await?;
            }
            AdminAction::Demote { email } => {
                commands::admin::set_admin(&email, false).await?;
            }
            AdminAction::Create {
                email,
                first_name,
                last_name,
            } => {
                commands::admin::create_user(&email, first_name.as_deref(), last_name.as_deref())
                    .await?;
            }
        },
        Commands::Cart {
            action: CartAction::Prune { older_than_days },
        } => commands::cart::prune(older_than_days).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_promote() {
        let cli = Cli::try_parse_from(["aba-cli", "admin", "promote", "-e", "a@b.co"])
            .map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Admin {
                    action: AdminAction::Promote { .. }
                }
            })
        ));
    }

    #[test]
    fn test_cart_prune_defaults_to_session_expiry() {
        let cli = Cli::try_parse_from(["aba-cli", "cart", "prune"]).map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Cart {
                    action: CartAction::Prune { older_than_days: 7 }
                }
            })
        ));
    }

    #[test]
    fn test_cart_prune_rejects_zero_days() {
        assert!(Cli::try_parse_from(["aba-cli", "cart", "prune", "--older-than-days", "0"]).is_err());
    }

    #[test]
    fn test_seed_flag() {
        let cli = Cli::try_parse_from(["aba-cli", "seed", "--migrate"]).map_err(|e| e.to_string());
        assert!(matches!(
            cli,
            Ok(Cli {
                command: Commands::Seed { migrate: true }
            })
        ));
    }
}
