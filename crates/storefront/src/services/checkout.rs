//! Checkout: turn a user's cart into a pending order.
//!
//! Everything happens in one transaction. A failure at any step (stock,
//! coupon, address) rolls back the order, the stock changes and the coupon
//! usage together, and the cart is left as it was.

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use abamade_core::{
    AddressId, CartOwner, CartTotals, CouponError, PricedLine, PricingPolicy, UserId,
};

use crate::db::orders::{decrement_stock, insert_item, insert_order};
use crate::db::{NewOrder, NewOrderItem, RepositoryError, cart, coupons};
use crate::models::{CartLine, OrderWithItems};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    /// Defaults to the user's default address.
    pub shipping_address_id: Option<AddressId>,
    /// Defaults to the shipping address.
    pub billing_address_id: Option<AddressId>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("your cart is empty")]
    EmptyCart,

    #[error("address not found")]
    AddressNotFound,

    #[error("a shipping address is required")]
    ShippingAddressRequired,

    #[error("coupon not found")]
    CouponNotFound,

    #[error("coupon cannot be applied: {0}")]
    Coupon(#[from] CouponError),

    #[error("not enough stock for {product}")]
    InsufficientStock { product: String },

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    policy: &'a PricingPolicy,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, policy: &'a PricingPolicy) -> Self {
        Self { pool, policy }
    }

    /// Place an order for everything in the user's cart.
    ///
    /// # Errors
    ///
    /// See [`CheckoutError`]; nothing is written when an error is returned.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<OrderWithItems, CheckoutError> {
        let owner = CartOwner::User(user_id);
        let mut tx = self.pool.begin().await?;

        let lines = cart::load_lines(&mut *tx, owner).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let shipping_address_id = match request.shipping_address_id {
            Some(id) => owned_address(&mut tx, id, user_id).await?,
            None => sqlx::query_scalar::<_, AddressId>(
                "SELECT id FROM storefront.address WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CheckoutError::ShippingAddressRequired)?,
        };
        let billing_address_id = match request.billing_address_id {
            Some(id) => owned_address(&mut tx, id, user_id).await?,
            None => shipping_address_id,
        };

        let priced: Vec<PricedLine> = lines.iter().map(CartLine::priced).collect();
        let subtotal = CartTotals::compute(&priced, self.policy).subtotal;

        let coupon = match request
            .coupon_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => Some(
                coupons::find_for_update(&mut *tx, code)
                    .await?
                    .ok_or(CheckoutError::CouponNotFound)?,
            ),
            None => None,
        };
        let discount = match &coupon {
            Some(coupon) => Some(coupon.rules.discount_for(subtotal, Utc::now())?),
            None => None,
        };
        let totals =
            CartTotals::compute_with_discount(&priced, self.policy, discount.unwrap_or_default());

        let order = insert_order(
            &mut *tx,
            &NewOrder {
                user_id,
                totals,
                coupon_id: coupon.as_ref().map(|c| c.id),
                shipping_address_id: Some(shipping_address_id),
                billing_address_id: Some(billing_address_id),
            },
        )
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let in_stock =
                decrement_stock(&mut *tx, line.product_id, line.variant_id, line.quantity).await?;
            if !in_stock {
                let product = match &line.variant_name {
                    Some(variant) => format!("{} ({variant})", line.product_name),
                    None => line.product_name.clone(),
                };
                return Err(CheckoutError::InsufficientStock { product });
            }

            let item = insert_item(
                &mut *tx,
                order.id,
                &NewOrderItem {
                    product_id: line.product_id,
                    variant_id: line.variant_id,
                    product_name: line.product_name.clone(),
                    variant_name: line.variant_name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                },
            )
            .await?;
            items.push(item);
        }

        if let Some(coupon) = &coupon {
            coupons::record_use(&mut *tx, coupon.id).await?;
        }
        cart::clear_lines(&mut *tx, owner).await?;

        tx.commit().await?;

        info!(order_id = %order.id, total = %order.total, "Order placed");
        Ok(OrderWithItems { order, items })
    }
}

async fn owned_address(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: AddressId,
    user_id: UserId,
) -> Result<AddressId, CheckoutError> {
    let found: Option<AddressId> =
        sqlx::query_scalar("SELECT id FROM storefront.address WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    found.ok_or(CheckoutError::AddressNotFound)
}
