//! Anonymous cart maintenance.

use abamade_storefront::db::CartRepository;

use super::{CommandError, connect};

/// Delete anonymous cart lines idle for more than `older_than_days` days.
pub async fn prune(older_than_days: i32) -> Result<(), CommandError> {
    let pool = connect().await?;

    let deleted = CartRepository::new(&pool)
        .delete_stale_session_lines(older_than_days)
        .await?;

    tracing::info!(deleted, older_than_days, "Pruned anonymous cart lines");
    Ok(())
}
