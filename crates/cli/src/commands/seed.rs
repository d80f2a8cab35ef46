//! Seed the demo catalog.

use tracing::info;

use super::{CommandError, connect};

/// Insert the demo catalog if the database has no categories yet.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    match abamade_storefront::db::seed(&pool).await? {
        Some(report) => info!(
            categories = report.categories,
            products = report.products,
            images = report.images,
            variants = report.variants,
            coupons = report.coupons,
            "Seed complete"
        ),
        None => info!("Database already has a catalog, nothing seeded"),
    }
    Ok(())
}
