//! User domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use abamade_core::{Email, UserId, UserRole};

/// A storefront account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Name shown next to reviews and in the back-office.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.email.local_part().to_owned(),
        }
    }
}

/// Editable profile fields.
///
/// Empty strings clear the field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Trim every field and turn blanks into `None`.
    #[must_use]
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }
        Self {
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            phone: clean(self.phone),
        }
    }
}

/// Notification preferences.
///
/// A user who never saved preferences gets everything enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preferences {
    pub marketing_emails: bool,
    pub order_updates: bool,
    pub newsletter: bool,
    pub product_updates: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            marketing_emails: true,
            order_updates: true,
            newsletter: true,
            product_updates: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(first: Option<&str>, last: Option<&str>) -> User {
        User {
            id: UserId::generate(),
            email: Email::parse("jane@abamade.com").unwrap(),
            first_name: first.map(str::to_owned),
            last_name: last.map(str::to_owned),
            phone: None,
            role: UserRole::Customer,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(user(Some("Jane"), Some("Doe")).display_name(), "Jane Doe");
        assert_eq!(user(Some("Jane"), None).display_name(), "Jane");
        assert_eq!(user(None, None).display_name(), "jane");
    }

    #[test]
    fn test_profile_update_normalized() {
        let update = ProfileUpdate {
            first_name: Some("  Jane ".to_owned()),
            last_name: Some("   ".to_owned()),
            phone: None,
        }
        .normalized();
        assert_eq!(update.first_name.as_deref(), Some("Jane"));
        assert_eq!(update.last_name, None);
    }

    #[test]
    fn test_preferences_default_all_enabled() {
        let prefs = Preferences::default();
        assert!(prefs.marketing_emails && prefs.order_updates);
        assert!(prefs.newsletter && prefs.product_updates);
    }
}
