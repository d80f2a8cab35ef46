//! Address repository.
//!
//! A user has at most one default address. Writes that set `is_default`
//! clear the user's other defaults in the same transaction, and the partial
//! unique index `address_one_default_per_user` rejects anything that slips
//! past.

use sqlx::{PgPool, Postgres, Transaction};

use abamade_core::{AddressId, UserId};

use super::RepositoryError;
use crate::models::{Address, AddressInput};

const ADDRESS_COLUMNS: &str = "id, user_id, address_line1, address_line2, city, state, \
                               postal_code, country, is_default, created_at, updated_at";

pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's addresses, default first, then newest.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            r"
            SELECT {ADDRESS_COLUMNS}
            FROM storefront.address
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(addresses)
    }

    /// One of the user's addresses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: AddressId, user_id: UserId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.address WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn default_address(&self, user_id: UserId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM storefront.address WHERE user_id = $1 AND is_default"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(address)
    }

    /// Create an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn create(
        &self,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            r"
            INSERT INTO storefront.address
                (user_id, address_line1, address_line2, city, state, postal_code, country, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(&input.address_line1)
        .bind(&input.address_line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "user already has a default address"))?;

        tx.commit().await?;
        Ok(address)
    }

    /// Replace an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to the user.
    pub async fn update(
        &self,
        id: AddressId,
        user_id: UserId,
        input: &AddressInput,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            clear_default(&mut tx, user_id).await?;
        }

        let address = sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE storefront.address
            SET address_line1 = $3, address_line2 = $4, city = $5, state = $6,
                postal_code = $7, country = $8, is_default = $9, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .bind(&input.address_line1)
        .bind(&input.address_line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "user already has a default address"))?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Make an address the user's default.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to the user.
    pub async fn set_default(&self, id: AddressId, user_id: UserId) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        clear_default(&mut tx, user_id).await?;

        let address = sqlx::query_as::<_, Address>(&format!(
            r"
            UPDATE storefront.address
            SET is_default = TRUE, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        tx.commit().await?;
        Ok(address)
    }

    /// Delete an address. Deleting the default leaves the user without one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address does not belong to the user.
    pub async fn delete(&self, id: AddressId, user_id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.address WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

async fn clear_default(
    tx: &mut Transaction<'_, Postgres>,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query(
        "UPDATE storefront.address SET is_default = FALSE, updated_at = NOW() \
         WHERE user_id = $1 AND is_default",
    )
    .bind(user_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
