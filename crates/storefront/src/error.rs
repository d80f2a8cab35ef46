//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Responses carry a JSON body `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, CartError, CheckoutError, NewsletterError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Newsletter sign-up failed.
    #[error("Newsletter error: {0}")]
    Newsletter(#[from] NewsletterError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request conflicts with current state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Session store read or write failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Rate limited.
    #[error("Rate limited")]
    RateLimited,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

const INTERNAL: &str = "Internal server error";

fn repository_parts(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_owned()),
        RepositoryError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
        }
    }
}

impl AppError {
    /// Status code and client-safe message.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            Self::Database(err) => repository_parts(err),
            Self::Internal(_) | Self::Session(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
            }
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::UserNotFound => {
                    (StatusCode::UNAUTHORIZED, "Invalid credentials".to_owned())
                }
                AuthError::UserAlreadyExists => (
                    StatusCode::CONFLICT,
                    "An account with this email already exists".to_owned(),
                ),
                AuthError::WeakPassword(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                AuthError::InvalidEmail(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid email address".to_owned())
                }
                AuthError::Repository(err) => repository_parts(err),
                AuthError::PasswordHash => {
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL.to_owned())
                }
            },
            Self::Cart(err) => match err {
                CartError::InvalidQuantity
                | CartError::VariantMismatch
                | CartError::ProductUnavailable => (StatusCode::BAD_REQUEST, err.to_string()),
                CartError::ProductNotFound | CartError::ItemNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                CartError::Repository(err) => repository_parts(err),
            },
            Self::Checkout(err) => match err {
                CheckoutError::EmptyCart
                | CheckoutError::ShippingAddressRequired
                | CheckoutError::Coupon(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                CheckoutError::AddressNotFound | CheckoutError::CouponNotFound => {
                    (StatusCode::NOT_FOUND, err.to_string())
                }
                CheckoutError::InsufficientStock { .. } => (StatusCode::CONFLICT, err.to_string()),
                CheckoutError::Repository(err) => repository_parts(err),
            },
            Self::Newsletter(err) => match err {
                NewsletterError::MissingEmail | NewsletterError::InvalidEmail => {
                    (StatusCode::BAD_REQUEST, err.to_string())
                }
                NewsletterError::NotSubscribed => (StatusCode::NOT_FOUND, err.to_string()),
                NewsletterError::Repository(err) => repository_parts(err),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Too many requests".to_owned()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.parts();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use abamade_core::CouponError;

    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn body(err: AppError) -> serde_json::Value {
        let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status(AppError::NotFound("test".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(AppError::Unauthorized("test".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status(AppError::Forbidden("test".into())), StatusCode::FORBIDDEN);
        assert_eq!(status(AppError::BadRequest("test".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(AppError::RateLimited), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status(AppError::Internal("test".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_error_status_codes() {
        assert_eq!(status(CartError::InvalidQuantity.into()), StatusCode::BAD_REQUEST);
        assert_eq!(status(CartError::ItemNotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status(CheckoutError::EmptyCart.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(CheckoutError::Coupon(CouponError::Expired).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(
                CheckoutError::InsufficientStock {
                    product: "Ankle Leather Boots".into()
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(CartError::Repository(RepositoryError::Conflict("x".into())).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(status(AuthError::UserAlreadyExists.into()), StatusCode::CONFLICT);
        assert_eq!(status(NewsletterError::NotSubscribed.into()), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption(
            "invalid email in database: secret".into(),
        ));
        assert_eq!(body(err).await, json!({ "error": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_body_carries_message() {
        let err: AppError = NewsletterError::MissingEmail.into();
        assert_eq!(body(err).await, json!({ "error": "Email is required" }));
    }
}
