//! Session middleware configuration and session-held cart tokens.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Anonymous
//! carts are keyed by a random [`CartSessionId`] kept in the session.

use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use abamade_core::{CartOwner, CartSessionId};

use crate::config::StorefrontConfig;
use crate::models::{CurrentUser, session_keys};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "aba_session";

/// Days of inactivity before a session, and its anonymous cart, expires.
pub const SESSION_EXPIRY_DAYS: i32 = 7;

const SESSION_EXPIRY_SECONDS: i64 = SESSION_EXPIRY_DAYS as i64 * 24 * 60 * 60;

/// Create the session layer with `PostgreSQL` store.
///
/// The `tower_sessions` schema is created by `db::run_migrations`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config)
}

/// Session layer over any store (tests use `MemoryStore`).
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.uses_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// The anonymous cart token, if this session has one. Leaves it in place.
pub async fn cart_session_id(session: &Session) -> Option<CartSessionId> {
    session
        .get::<CartSessionId>(session_keys::CART_SESSION)
        .await
        .ok()
        .flatten()
}

/// Resolve the cart owner for reads.
///
/// A signed-in user owns their account cart. Anonymous visitors without a
/// token have no cart yet, so `None` means "empty cart".
pub async fn cart_owner(session: &Session, user: Option<&CurrentUser>) -> Option<CartOwner> {
    match user {
        Some(user) => Some(CartOwner::User(user.id)),
        None => cart_session_id(session).await.map(CartOwner::Session),
    }
}

/// Resolve the cart owner for writes, issuing an anonymous token on first use.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn cart_owner_or_create(
    session: &Session,
    user: Option<&CurrentUser>,
) -> Result<CartOwner, tower_sessions::session::Error> {
    if let Some(owner) = cart_owner(session, user).await {
        return Ok(owner);
    }
    let id = CartSessionId::generate();
    session.insert(session_keys::CART_SESSION, id).await?;
    tracing::debug!(cart_session_id = %id, "Issued anonymous cart token");
    Ok(CartOwner::Session(id))
}

/// Remove and return the anonymous cart token (after it has been merged).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take_cart_session_id(
    session: &Session,
) -> Result<Option<CartSessionId>, tower_sessions::session::Error> {
    session
        .remove::<CartSessionId>(session_keys::CART_SESSION)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use abamade_core::{Email, UserId, UserRole};
    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: UserId::generate(),
            email: Email::parse("shopper@example.com").unwrap(),
            role: UserRole::Customer,
        }
    }

    #[tokio::test]
    async fn test_anonymous_cart_token_lifecycle() {
        let session = session();
        assert!(cart_owner(&session, None).await.is_none());

        let owner = cart_owner_or_create(&session, None).await.unwrap();
        let CartOwner::Session(id) = owner else {
            panic!("expected a session owner");
        };
        assert_eq!(cart_owner_or_create(&session, None).await.unwrap(), owner);

        assert_eq!(take_cart_session_id(&session).await.unwrap(), Some(id));
        assert!(cart_owner(&session, None).await.is_none());
    }

    #[tokio::test]
    async fn test_signed_in_user_owns_cart() {
        let session = session();
        let user = user();
        let owner = cart_owner_or_create(&session, Some(&user)).await.unwrap();
        assert_eq!(owner, CartOwner::User(user.id));
        assert!(take_cart_session_id(&session).await.unwrap().is_none());
    }
}
