//! Newsletter subscription outcomes.

use serde::Serialize;

/// What happened when an address was submitted to the newsletter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeOutcome {
    /// A new address was added.
    Subscribed,
    /// A previously unsubscribed address was reactivated.
    Resubscribed,
    /// The address was already on the list; nothing changed.
    AlreadySubscribed,
}

impl SubscribeOutcome {
    /// Message shown to the visitor.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Subscribed => "Thank you for subscribing to our newsletter!",
            Self::Resubscribed => "Welcome back! You've been resubscribed to our newsletter.",
            Self::AlreadySubscribed => "You're already subscribed to our newsletter!",
        }
    }
}
