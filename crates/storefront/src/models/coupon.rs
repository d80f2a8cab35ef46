//! Coupons.

use serde::Serialize;

use abamade_core::{CouponId, CouponRules};

#[derive(Debug, Clone, Serialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub rules: CouponRules,
}

impl Coupon {
    /// Codes are matched case-insensitively and stored upper-case.
    #[must_use]
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}
