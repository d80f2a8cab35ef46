//! Customer addresses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use abamade_core::{AddressId, UserId};

/// A saved shipping or billing address.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields submitted when creating or replacing an address.
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInput {
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Trim fields and check that the required ones are present.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validated(self) -> Result<Self, String> {
        fn required(name: &str, value: String) -> Result<String, String> {
            let value = value.trim().to_owned();
            if value.is_empty() {
                Err(format!("{name} is required"))
            } else {
                Ok(value)
            }
        }

        Ok(Self {
            address_line1: required("address_line1", self.address_line1)?,
            address_line2: self
                .address_line2
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty()),
            city: required("city", self.city)?,
            state: required("state", self.state)?,
            postal_code: required("postal_code", self.postal_code)?,
            country: required("country", self.country)?,
            is_default: self.is_default,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input() -> AddressInput {
        AddressInput {
            address_line1: " 12 Market St ".to_owned(),
            address_line2: Some("  ".to_owned()),
            city: "Lagos".to_owned(),
            state: "LA".to_owned(),
            postal_code: "100001".to_owned(),
            country: "NG".to_owned(),
            is_default: true,
        }
    }

    #[test]
    fn test_validated_trims_and_drops_blank_line2() {
        let address = input().validated().unwrap();
        assert_eq!(address.address_line1, "12 Market St");
        assert_eq!(address.address_line2, None);
        assert!(address.is_default);
    }

    #[test]
    fn test_validated_rejects_missing_city() {
        let mut bad = input();
        bad.city = "   ".to_owned();
        assert_eq!(bad.validated().unwrap_err(), "city is required");
    }
}
