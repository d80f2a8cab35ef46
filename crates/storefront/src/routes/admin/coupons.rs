//! Back-office coupons.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use abamade_core::{CouponRules, DiscountType};

use crate::db::CouponRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Coupon;
use crate::state::AppState;

/// Body of `POST /admin/coupons`.
#[derive(Debug, Deserialize)]
pub struct CouponInput {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_discount: Option<Decimal>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "active")]
    pub is_active: bool,
    pub usage_limit: Option<i32>,
}

const fn active() -> bool {
    true
}

impl CouponInput {
    fn rules(&self) -> Result<CouponRules> {
        if self.code.trim().is_empty() {
            return Err(AppError::BadRequest("code is required".to_owned()));
        }
        if self.discount_value <= Decimal::ZERO {
            return Err(AppError::BadRequest(
                "discount_value must be positive".to_owned(),
            ));
        }
        if self.discount_type == DiscountType::Percentage
            && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(AppError::BadRequest(
                "a percentage discount cannot exceed 100".to_owned(),
            ));
        }
        if let (Some(start), Some(end)) = (self.starts_at, self.ends_at)
            && end <= start
        {
            return Err(AppError::BadRequest(
                "ends_at must be after starts_at".to_owned(),
            ));
        }
        Ok(CouponRules {
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_purchase: self.min_purchase,
            max_discount: self.max_discount,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            is_active: self.is_active,
            usage_limit: self.usage_limit,
            usage_count: 0,
        })
    }
}

/// Create a coupon. Codes are stored upper-case and must be unique.
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CouponInput>,
) -> Result<(StatusCode, Json<Coupon>)> {
    let rules = input.rules()?;
    let coupon = CouponRepository::new(state.pool())
        .create(&input.code, input.description.as_deref(), &rules)
        .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// Look up a coupon by code (case-insensitive).
pub async fn show(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Coupon>> {
    CouponRepository::new(state.pool())
        .find_by_code(&code)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: &str) -> CouponInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_coupon_input_defaults() {
        let rules = input(r#"{"code":"spring","discount_type":"fixed","discount_value":"5"}"#)
            .rules()
            .unwrap();
        assert!(rules.is_active);
        assert_eq!(rules.usage_count, 0);
        assert_eq!(rules.discount_type, DiscountType::Fixed);
    }

    #[test]
    fn test_coupon_input_validation() {
        assert!(
            input(r#"{"code":"x","discount_type":"percentage","discount_value":"150"}"#)
                .rules()
                .is_err()
        );
        assert!(
            input(r#"{"code":" ","discount_type":"fixed","discount_value":"5"}"#)
                .rules()
                .is_err()
        );
        assert!(
            input(r#"{"code":"x","discount_type":"fixed","discount_value":"0"}"#)
                .rules()
                .is_err()
        );
        assert!(
            input(
                r#"{"code":"x","discount_type":"fixed","discount_value":"5",
                    "starts_at":"2026-02-01T00:00:00Z","ends_at":"2026-01-01T00:00:00Z"}"#
            )
            .rules()
            .is_err()
        );
    }
}
