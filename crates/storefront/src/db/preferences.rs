//! Notification preferences repository.

use sqlx::PgPool;

use abamade_core::UserId;

use super::RepositoryError;
use crate::models::Preferences;

pub struct PreferencesRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PreferencesRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Stored preferences, or the all-enabled defaults when none were saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Preferences, RepositoryError> {
        let prefs = sqlx::query_as::<_, Preferences>(
            r"
            SELECT marketing_emails, order_updates, newsletter, product_updates
            FROM storefront.user_preferences
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        Ok(prefs.unwrap_or_default())
    }

    /// Save preferences, creating the row on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn upsert(
        &self,
        user_id: UserId,
        prefs: Preferences,
    ) -> Result<Preferences, RepositoryError> {
        let saved = sqlx::query_as::<_, Preferences>(
            r"
            INSERT INTO storefront.user_preferences
                (user_id, marketing_emails, order_updates, newsletter, product_updates)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET marketing_emails = EXCLUDED.marketing_emails,
                order_updates    = EXCLUDED.order_updates,
                newsletter       = EXCLUDED.newsletter,
                product_updates  = EXCLUDED.product_updates,
                updated_at       = NOW()
            RETURNING marketing_emails, order_updates, newsletter, product_updates
            ",
        )
        .bind(user_id)
        .bind(prefs.marketing_emails)
        .bind(prefs.order_updates)
        .bind(prefs.newsletter)
        .bind(prefs.product_updates)
        .fetch_one(self.pool)
        .await?;
        Ok(saved)
    }
}
