//! Coupon discount rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::pricing::round_cents;

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.discount_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percent off the subtotal (`15` = 15%).
    Percentage,
    /// Fixed amount off the subtotal.
    Fixed,
}

/// Why a coupon cannot be applied.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponError {
    #[error("this coupon is no longer active")]
    Inactive,
    #[error("this coupon is not valid yet")]
    NotStarted,
    #[error("this coupon has expired")]
    Expired,
    #[error("this coupon has reached its usage limit")]
    UsageLimitReached,
    #[error("a minimum purchase of {minimum} is required for this coupon")]
    BelowMinimumPurchase { minimum: Decimal },
}

/// The eligibility and discount rules stored with a coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponRules {
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub usage_limit: Option<i32>,
    pub usage_count: i32,
}

impl CouponRules {
    /// Check eligibility and compute the discount for a cart subtotal.
    ///
    /// The result is rounded to cents, capped by `max_discount` and never
    /// larger than the subtotal.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] naming the first rule the cart fails.
    pub fn discount_for(&self, subtotal: Decimal, now: DateTime<Utc>) -> Result<Decimal, CouponError> {
        if !self.is_active {
            return Err(CouponError::Inactive);
        }
        if self.starts_at.is_some_and(|start| now < start) {
            return Err(CouponError::NotStarted);
        }
        if self.ends_at.is_some_and(|end| now > end) {
            return Err(CouponError::Expired);
        }
        if self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit)
        {
            return Err(CouponError::UsageLimitReached);
        }
        if let Some(minimum) = self.min_purchase
            && subtotal < minimum
        {
            return Err(CouponError::BelowMinimumPurchase { minimum });
        }

        let raw = match self.discount_type {
            DiscountType::Percentage => subtotal * self.discount_value / Decimal::ONE_HUNDRED,
            DiscountType::Fixed => self.discount_value,
        };
        let capped = self.max_discount.map_or(raw, |max| raw.min(max));
        Ok(round_cents(capped.clamp(Decimal::ZERO, subtotal)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use chrono::Duration;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rules(discount_type: DiscountType, value: &str) -> CouponRules {
        CouponRules {
            discount_type,
            discount_value: dec(value),
            min_purchase: None,
            max_discount: None,
            starts_at: None,
            ends_at: None,
            is_active: true,
            usage_limit: None,
            usage_count: 0,
        }
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = rules(DiscountType::Percentage, "15");
        assert_eq!(
            coupon.discount_for(dec("129.99"), Utc::now()).unwrap(),
            dec("19.50")
        );
    }

    #[test]
    fn test_fixed_discount_capped_at_subtotal() {
        let coupon = rules(DiscountType::Fixed, "50");
        assert_eq!(
            coupon.discount_for(dec("30.00"), Utc::now()).unwrap(),
            dec("30.00")
        );
    }

    #[test]
    fn test_max_discount_cap() {
        let mut coupon = rules(DiscountType::Percentage, "50");
        coupon.max_discount = Some(dec("25.00"));
        assert_eq!(
            coupon.discount_for(dec("200.00"), Utc::now()).unwrap(),
            dec("25.00")
        );
    }

    #[test]
    fn test_inactive() {
        let mut coupon = rules(DiscountType::Fixed, "5");
        coupon.is_active = false;
        assert_eq!(
            coupon.discount_for(dec("10.00"), Utc::now()),
            Err(CouponError::Inactive)
        );
    }

    #[test]
    fn test_date_window() {
        let now = Utc::now();
        let mut coupon = rules(DiscountType::Fixed, "5");
        coupon.starts_at = Some(now + Duration::days(1));
        assert_eq!(
            coupon.discount_for(dec("10.00"), now),
            Err(CouponError::NotStarted)
        );

        coupon.starts_at = Some(now - Duration::days(10));
        coupon.ends_at = Some(now - Duration::days(1));
        assert_eq!(
            coupon.discount_for(dec("10.00"), now),
            Err(CouponError::Expired)
        );
    }

    #[test]
    fn test_usage_limit() {
        let mut coupon = rules(DiscountType::Fixed, "5");
        coupon.usage_limit = Some(3);
        coupon.usage_count = 3;
        assert_eq!(
            coupon.discount_for(dec("10.00"), Utc::now()),
            Err(CouponError::UsageLimitReached)
        );
    }

    #[test]
    fn test_minimum_purchase() {
        let mut coupon = rules(DiscountType::Fixed, "5");
        coupon.min_purchase = Some(dec("75.00"));
        assert_eq!(
            coupon.discount_for(dec("74.99"), Utc::now()),
            Err(CouponError::BelowMinimumPurchase {
                minimum: dec("75.00")
            })
        );
        assert!(coupon.discount_for(dec("75.00"), Utc::now()).is_ok());
    }
}
