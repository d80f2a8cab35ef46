//! Newsletter sign-up.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use abamade_core::Email;

use crate::db::{NewsletterRepository, RepositoryError};
use crate::models::SubscribeOutcome;

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Email not found in our subscription list.")]
    NotSubscribed,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Message returned after a successful unsubscribe.
pub const UNSUBSCRIBED_MESSAGE: &str =
    "You have been successfully unsubscribed from our newsletter.";

/// Normalize a submitted address.
///
/// # Errors
///
/// Returns `MissingEmail` for blank input and `InvalidEmail` otherwise.
pub fn parse_email(raw: Option<&str>) -> Result<Email, NewsletterError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(NewsletterError::MissingEmail);
    }
    Email::parse_normalized(raw).map_err(|_| NewsletterError::InvalidEmail)
}

pub struct NewsletterService<'a> {
    subscribers: NewsletterRepository<'a>,
}

impl<'a> NewsletterService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            subscribers: NewsletterRepository::new(pool),
        }
    }

    /// # Errors
    ///
    /// Returns a validation error for bad input or `Repository` on failure.
    #[instrument(skip(self, raw))]
    pub async fn subscribe(&self, raw: Option<&str>) -> Result<SubscribeOutcome, NewsletterError> {
        let email = parse_email(raw)?;
        Ok(self.subscribers.subscribe(&email).await?)
    }

    /// # Errors
    ///
    /// Returns `NotSubscribed` when the address is unknown.
    #[instrument(skip(self, raw))]
    pub async fn unsubscribe(&self, raw: Option<&str>) -> Result<(), NewsletterError> {
        let email = parse_email(raw)?;
        self.subscribers
            .unsubscribe(&email)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => NewsletterError::NotSubscribed,
                other => NewsletterError::Repository(other),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_email_messages() {
        assert_eq!(
            parse_email(None).unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            parse_email(Some("   ")).unwrap_err().to_string(),
            "Email is required"
        );
        assert_eq!(
            parse_email(Some("not-an-email")).unwrap_err().to_string(),
            "Please enter a valid email address"
        );
        assert_eq!(
            parse_email(Some(" Jane@Example.COM ")).unwrap().as_str(),
            "jane@example.com"
        );
    }
}
