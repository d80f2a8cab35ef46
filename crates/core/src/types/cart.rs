//! Cart ownership.

use serde::{Deserialize, Serialize};

use super::id::{CartSessionId, UserId};

/// Who a cart belongs to.
///
/// Signed-in shoppers own their cart through their account. Anonymous
/// visitors own a cart through a random token stored in their server-side
/// session; that cart is folded into the account cart when they sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    User(UserId),
    Session(CartSessionId),
}

impl CartOwner {
    /// The account ID, when the cart belongs to a signed-in user.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Session(_) => None,
        }
    }

    /// The anonymous session token, when the cart belongs to a visitor.
    #[must_use]
    pub const fn session_id(&self) -> Option<CartSessionId> {
        match self {
            Self::User(_) => None,
            Self::Session(id) => Some(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_accessors_are_exclusive() {
        let user = CartOwner::User(UserId::generate());
        assert!(user.user_id().is_some());
        assert!(user.session_id().is_none());

        let visitor = CartOwner::Session(CartSessionId::generate());
        assert!(visitor.user_id().is_none());
        assert!(visitor.session_id().is_some());
    }
}
