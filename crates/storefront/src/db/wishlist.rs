//! Wishlist repository.

use sqlx::PgPool;

use abamade_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::WishlistEntry;

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's wishlist, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<WishlistEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, WishlistEntry>(
            r"
            SELECT w.id, w.product_id, p.name AS product_name, p.slug AS product_slug,
                   p.price, p.sale_price,
                   (SELECT i.url FROM storefront.product_image i
                    WHERE i.product_id = p.id
                    ORDER BY i.is_primary DESC, i.sort_order
                    LIMIT 1) AS image_url,
                   p.stock_quantity > 0 AS in_stock,
                   w.created_at AS added_at
            FROM storefront.wishlist_item w
            JOIN storefront.product p ON p.id = w.product_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// Save a product. Saving it twice is a no-op; returns whether a row
    /// was inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn add(&self, user_id: UserId, product_id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO storefront.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product was not saved.
    pub async fn remove(&self, user_id: UserId, product_id: ProductId) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.wishlist_item WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contains(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM storefront.wishlist_item WHERE user_id = $1 AND product_id = $2
            )
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.wishlist_item WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
