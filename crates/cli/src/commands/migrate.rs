//! Database migration command.
//!
//! Applies `crates/storefront/migrations/` and creates the session store
//! table. The server never migrates on startup.

use super::{CommandError, connect};

/// Run storefront database migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running storefront migrations...");
    abamade_storefront::db::run_migrations(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
