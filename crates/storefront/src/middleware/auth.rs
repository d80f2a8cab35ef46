//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in user (and, for the
//! back-office, an admin) in route handlers.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires an authenticated user.
///
/// `/api/*` requests without a session user get a JSON 401; everything else
/// is redirected to the login page with a `callbackUrl` back to the
/// requested path.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page, carrying the original path.
    RedirectToLogin(String),
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl AuthRejection {
    fn for_path(parts: &Parts) -> Self {
        // Nested routers strip their prefix from `parts.uri`.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        if uri.path().starts_with("/api/") {
            return Self::Unauthorized;
        }
        let target = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_owned(), ToString::to_string);
        Self::RedirectToLogin(target)
    }
}

/// Login URL that sends the user back to `target` afterwards.
#[must_use]
pub fn login_redirect_url(target: &str) -> String {
    format!("/auth/login?callbackUrl={}", urlencoding::encode(target))
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(target) => {
                Redirect::to(&login_redirect_url(&target)).into_response()
            }
            Self::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_owned()).into_response()
            }
        }
    }
}

async fn session_user(parts: &Parts) -> Option<CurrentUser> {
    let session = parts.extensions.get::<Session>()?;
    session
        .get::<CurrentUser>(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_user(parts)
            .await
            .map(Self)
            .ok_or_else(|| AuthRejection::for_path(parts))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if the user is not logged in.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

/// Extractor that requires a signed-in admin.
///
/// The role in the session is only a snapshot from login, so it is re-read
/// from the database on every request. Demoted users lose access at once.
pub struct RequireAdmin(pub CurrentUser);

/// Error returned when back-office access is denied.
#[derive(Debug)]
pub enum AdminRejection {
    /// Not signed in.
    Unauthenticated(AuthRejection),
    /// Signed in, but not an admin.
    Forbidden,
    /// The role lookup failed.
    Lookup(AppError),
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated(rejection) => rejection.into_response(),
            Self::Forbidden => AppError::Forbidden("Admin access required".to_owned()).into_response(),
            Self::Lookup(err) => err.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(mut user) = RequireAuth::from_request_parts(parts, state)
            .await
            .map_err(AdminRejection::Unauthenticated)?;

        let role = UserRepository::new(state.pool())
            .role_of(user.id)
            .await
            .map_err(|e| AdminRejection::Lookup(e.into()))?
            .ok_or(AdminRejection::Forbidden)?;

        if !role.is_admin() {
            tracing::warn!(user_id = %user.id, "Back-office access denied");
            return Err(AdminRejection::Forbidden);
        }

        user.role = role;
        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, StatusCode, header};

    use super::*;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_login_redirect_url_encodes_target() {
        assert_eq!(
            login_redirect_url("/account/orders?page=2"),
            "/auth/login?callbackUrl=%2Faccount%2Forders%3Fpage%3D2"
        );
    }

    #[test]
    fn test_rejection_depends_on_path() {
        assert!(matches!(
            AuthRejection::for_path(&parts("/api/checkout")),
            AuthRejection::Unauthorized
        ));
        match AuthRejection::for_path(&parts("/account/addresses")) {
            AuthRejection::RedirectToLogin(target) => assert_eq!(target, "/account/addresses"),
            AuthRejection::Unauthorized => panic!("expected redirect"),
        }
    }

    #[test]
    fn test_rejection_responses() {
        let response = AuthRejection::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthRejection::RedirectToLogin("/account".into()).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login?callbackUrl=%2Faccount"
        );

        assert_eq!(
            AdminRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[tokio::test]
    async fn test_missing_session_rejects() {
        let mut parts = parts("/api/wishlist");
        let result = RequireAuth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthRejection::Unauthorized)));

        let OptionalAuth(user) = OptionalAuth::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(user.is_none());
    }
}
