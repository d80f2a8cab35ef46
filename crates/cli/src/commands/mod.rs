//! CLI command implementations.

pub mod admin;
pub mod cart;
pub mod migrate;
pub mod seed;

use abamade_storefront::db;
use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by all commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository-level failure (migrations, seeding, user lookups).
    #[error("{0}")]
    Repository(#[from] db::RepositoryError),
}

/// Storefront database URL, with the same fallback the server uses.
fn database_url() -> Result<SecretString, CommandError> {
    ["STOREFRONT_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
        .map(SecretString::from)
        .ok_or(CommandError::MissingEnvVar("STOREFRONT_DATABASE_URL"))
}

/// Load `.env` and connect to the storefront database.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();
    let url = database_url()?;
    tracing::info!("Connecting to storefront database...");
    Ok(db::create_pool(&url).await?)
}
