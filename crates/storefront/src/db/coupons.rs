//! Coupon repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};

use abamade_core::{CouponId, CouponRules, DiscountType};

use super::RepositoryError;
use crate::models::Coupon;

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: CouponId,
    code: String,
    description: Option<String>,
    discount_type: DiscountType,
    discount_value: Decimal,
    min_purchase: Option<Decimal>,
    max_discount: Option<Decimal>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    is_active: bool,
    usage_limit: Option<i32>,
    usage_count: i32,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            description: row.description,
            rules: CouponRules {
                discount_type: row.discount_type,
                discount_value: row.discount_value,
                min_purchase: row.min_purchase,
                max_discount: row.max_discount,
                starts_at: row.starts_at,
                ends_at: row.ends_at,
                is_active: row.is_active,
                usage_limit: row.usage_limit,
                usage_count: row.usage_count,
            },
        }
    }
}

/// Look up a coupon by code, locking the row for the rest of the
/// transaction so usage counting stays exact.
pub(crate) async fn find_for_update<'e, E>(
    executor: E,
    code: &str,
) -> Result<Option<Coupon>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, CouponRow>(
        r"
        SELECT id, code, description, discount_type, discount_value, min_purchase,
               max_discount, starts_at, ends_at, is_active, usage_limit, usage_count
        FROM storefront.coupon
        WHERE code = $1
        FOR UPDATE
        ",
    )
    .bind(Coupon::normalize_code(code))
    .fetch_optional(executor)
    .await?;
    Ok(row.map(Coupon::from))
}

/// Count one use of a coupon.
pub(crate) async fn record_use<'e, E>(executor: E, id: CouponId) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        "UPDATE storefront.coupon SET usage_count = usage_count + 1, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(())
}

pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r"
            SELECT id, code, description, discount_type, discount_value, min_purchase,
                   max_discount, starts_at, ends_at, is_active, usage_limit, usage_count
            FROM storefront.coupon
            WHERE code = $1
            ",
        )
        .bind(Coupon::normalize_code(code))
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Coupon::from))
    }

    /// Create a coupon. The code is stored upper-case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code is taken.
    pub async fn create(
        &self,
        code: &str,
        description: Option<&str>,
        rules: &CouponRules,
    ) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r"
            INSERT INTO storefront.coupon
                (code, description, discount_type, discount_value, min_purchase, max_discount,
                 starts_at, ends_at, is_active, usage_limit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, code, description, discount_type, discount_value, min_purchase,
                      max_discount, starts_at, ends_at, is_active, usage_limit, usage_count
            ",
        )
        .bind(Coupon::normalize_code(code))
        .bind(description)
        .bind(rules.discount_type)
        .bind(rules.discount_value)
        .bind(rules.min_purchase)
        .bind(rules.max_discount)
        .bind(rules.starts_at)
        .bind(rules.ends_at)
        .bind(rules.is_active)
        .bind(rules.usage_limit)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or(e, "coupon code already exists"))?;
        Ok(row.into())
    }
}
