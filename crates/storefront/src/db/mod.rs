//! Database operations for the storefront `PostgreSQL` database.
//!
//! # Schema: `storefront`
//!
//! ## Tables
//!
//! - `category`, `product`, `product_image`, `product_variant`, `variant_option` - Catalog
//! - `user`, `user_password`, `user_preferences` - Accounts
//! - `address` - Shipping/billing addresses (one default per user)
//! - `cart_item` - Cart lines owned by a user or an anonymous cart session
//! - `wishlist_item`, `review` - Customer activity
//! - `coupon`, `customer_order`, `order_item` - Checkout
//! - `newsletter_subscriber`
//! - `tower_sessions.session` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p abamade-cli -- migrate
//! ```
//! or through `POST /api/init-db` when `STOREFRONT_ALLOW_DB_INIT=true`.

pub mod addresses;
pub mod admin;
pub mod cart;
pub mod categories;
pub mod coupons;
pub mod newsletter;
pub mod orders;
pub mod preferences;
pub mod products;
pub mod reviews;
pub mod seed;
pub mod users;
pub mod wishlist;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

pub use addresses::AddressRepository;
pub use admin::AdminRepository;
pub use cart::CartRepository;
pub use categories::CategoryRepository;
pub use coupons::CouponRepository;
pub use newsletter::NewsletterRepository;
pub use orders::{NewOrder, NewOrderItem, OrderRepository};
pub use preferences::PreferencesRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use seed::{SeedReport, seed};
pub use users::UserRepository;
pub use wishlist::WishlistRepository;

/// Embedded storefront migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn unique_or(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the storefront migrations and the session store schema.
///
/// # Errors
///
/// Returns an error if either migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), RepositoryError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| RepositoryError::Database(e.into()))?;
    PostgresStore::new(pool.clone()).migrate().await?;
    Ok(())
}
