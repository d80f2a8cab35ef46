//! Admin user management commands.
//!
//! Admins are ordinary storefront accounts with `role = 'admin'`.
//!
//! # Usage
//!
//! ```bash
//! # Promote an account that already signed up (recommended)
//! aba-cli admin promote -e admin@example.com
//!
//! # Create an account directly; prints a temporary password
//! aba-cli admin create -e admin@example.com --first-name Ada
//! ```

use abamade_core::{Email, UserRole};
use abamade_storefront::db::UserRepository;
use abamade_storefront::services::auth::hash_password;
use rand::{Rng, distr::Alphanumeric};
use thiserror::Error;

use super::{CommandError, connect};

/// Length of generated temporary passwords.
const TEMP_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Connection or repository failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// No account with that email.
    #[error("No user with email: {0}")]
    UserNotFound(String),

    /// Account already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Hashing the temporary password failed.
    #[error("Failed to hash password")]
    PasswordHash,
}

impl From<abamade_storefront::db::RepositoryError> for AdminError {
    fn from(e: abamade_storefront::db::RepositoryError) -> Self {
        Self::Command(e.into())
    }
}

fn parse_email(email: &str) -> Result<Email, AdminError> {
    Email::parse_normalized(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))
}

fn temporary_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TEMP_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}

/// Grant (or revoke) the admin role on an existing account.
pub async fn set_admin(email: &str, admin: bool) -> Result<(), AdminError> {
    let email = parse_email(email)?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    let role = if admin {
        UserRole::Admin
    } else {
        UserRole::Customer
    };
    if user.role == role {
        tracing::info!("{} already has role {}", email, role);
        return Ok(());
    }

    users.set_role(user.id, role).await?;
    tracing::info!("Updated {} ({}) to role {}", email, user.id, role);
    Ok(())
}

/// Create a new admin account with a generated password.
///
/// The password is logged once; the user should change it after signing in.
pub async fn create_user(
    email: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<(), AdminError> {
    let email = parse_email(email)?;
    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    if users.get_by_email(&email).await?.is_some() {
        return Err(AdminError::UserExists(email.to_string()));
    }

    let password = temporary_password();
    let hash = hash_password(&password).map_err(|_| AdminError::PasswordHash)?;

    let user = users
        .create_with_password(&email, first_name, last_name, &hash)
        .await?;
    users.set_role(user.id, UserRole::Admin).await?;

    tracing::info!("Admin user created! ID: {}, Email: {}", user.id, email);
    tracing::warn!("Temporary password: {password} (change it from /account/password)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_password_shape() {
        let password = temporary_password();
        assert_eq!(password.len(), TEMP_PASSWORD_LENGTH);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(password, temporary_password());
    }

    #[test]
    fn test_parse_email_rejects_garbage() {
        assert!(matches!(
            parse_email("not-an-email"),
            Err(AdminError::InvalidEmail(_))
        ));
        assert_eq!(
            parse_email(" Admin@Example.COM ").map(|e| e.to_string()).ok(),
            Some("admin@example.com".to_owned())
        );
    }
}
