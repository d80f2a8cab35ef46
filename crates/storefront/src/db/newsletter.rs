//! Newsletter subscriber repository.

use sqlx::PgPool;

use abamade_core::Email;

use super::RepositoryError;
use crate::models::SubscribeOutcome;

pub struct NewsletterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NewsletterRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an address, reactivating it if it had unsubscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn subscribe(&self, email: &Email) -> Result<SubscribeOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<bool> = sqlx::query_scalar(
            "SELECT is_subscribed FROM storefront.newsletter_subscriber WHERE email = $1 FOR UPDATE",
        )
        .bind(email.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match existing {
            Some(true) => SubscribeOutcome::AlreadySubscribed,
            Some(false) => {
                sqlx::query(
                    "UPDATE storefront.newsletter_subscriber \
                     SET is_subscribed = TRUE, updated_at = NOW() WHERE email = $1",
                )
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
                SubscribeOutcome::Resubscribed
            }
            None => {
                let inserted = sqlx::query(
                    "INSERT INTO storefront.newsletter_subscriber (email) VALUES ($1) \
                     ON CONFLICT (email) DO NOTHING",
                )
                .bind(email.as_str())
                .execute(&mut *tx)
                .await?;
                // A concurrent request may have inserted the address first.
                if inserted.rows_affected() == 0 {
                    SubscribeOutcome::AlreadySubscribed
                } else {
                    SubscribeOutcome::Subscribed
                }
            }
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Unsubscribe an address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address was never subscribed.
    pub async fn unsubscribe(&self, email: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE storefront.newsletter_subscriber \
             SET is_subscribed = FALSE, updated_at = NOW() WHERE email = $1",
        )
        .bind(email.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
