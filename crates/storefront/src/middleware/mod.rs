//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and the Sentry scope)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting (governor) on `/auth` and `/api`
//!
//! Authentication is enforced per handler through the extractors in [`auth`].

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, login_redirect_url,
    set_current_user,
};
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{
    cart_owner, cart_owner_or_create, cart_session_id, create_session_layer, session_layer,
    take_cart_session_id,
};
