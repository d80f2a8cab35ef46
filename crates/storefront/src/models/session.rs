//! Session-related types.
//!
//! Types stored in the server-side session.

use serde::{Deserialize, Serialize};

use abamade_core::{Email, UserId, UserRole};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user. The
/// role is a snapshot taken at login; back-office access re-checks it
/// against the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Role at the time of login.
    pub role: UserRole,
}

/// Session keys.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the anonymous cart token (`CartSessionId`).
    pub const CART_SESSION: &str = "cart_session_id";
}
