//! Order repository.
//!
//! Writes that must share a transaction with other tables (checkout) are
//! free functions over a [`PgExecutor`]; reads and status changes go through
//! [`OrderRepository`].

use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use abamade_core::{
    AddressId, CartTotals, CouponId, OrderId, OrderStatus, ProductId, UserId, VariantId,
};

use super::RepositoryError;
use crate::models::admin::AdminOrderQuery;
use crate::models::{Order, OrderItem, OrderWithItems};

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.status, o.subtotal, o.discount, o.shipping, \
                             o.tax, o.total, o.coupon_id, o.payment_intent_id, \
                             o.shipping_address_id, o.billing_address_id, o.created_at, \
                             o.updated_at";

/// Header of an order about to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub totals: CartTotals,
    pub coupon_id: Option<CouponId>,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
}

/// A line copied from the cart at checkout.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

pub(crate) async fn insert_order<'e, E>(executor: E, order: &NewOrder) -> Result<Order, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let created = sqlx::query_as::<_, Order>(&format!(
        r"
        INSERT INTO storefront.customer_order AS o
            (user_id, status, subtotal, discount, shipping, tax, total, coupon_id,
             shipping_address_id, billing_address_id)
        VALUES ($1, 'pending', $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {ORDER_COLUMNS}
        "
    ))
    .bind(order.user_id)
    .bind(order.totals.subtotal)
    .bind(order.totals.discount)
    .bind(order.totals.shipping)
    .bind(order.totals.tax)
    .bind(order.totals.total)
    .bind(order.coupon_id)
    .bind(order.shipping_address_id)
    .bind(order.billing_address_id)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

pub(crate) async fn insert_item<'e, E>(
    executor: E,
    order_id: OrderId,
    item: &NewOrderItem,
) -> Result<OrderItem, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let created = sqlx::query_as::<_, OrderItem>(
        r"
        INSERT INTO storefront.order_item
            (order_id, product_id, variant_id, product_name, variant_name, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, order_id, product_id, variant_id, product_name, variant_name,
                  quantity, unit_price
        ",
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(item.variant_id)
    .bind(&item.product_name)
    .bind(&item.variant_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .fetch_one(executor)
    .await?;
    Ok(created)
}

/// Take `quantity` units out of stock. Returns `false` when there are not
/// enough units, in which case nothing changes.
pub(crate) async fn decrement_stock<'e, E>(
    executor: E,
    product_id: ProductId,
    variant_id: Option<VariantId>,
    quantity: i32,
) -> Result<bool, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let result = match variant_id {
        Some(variant_id) => {
            sqlx::query(
                r"
                UPDATE storefront.product_variant
                SET stock_quantity = stock_quantity - $1, updated_at = NOW()
                WHERE id = $2 AND product_id = $3 AND stock_quantity >= $1
                ",
            )
            .bind(quantity)
            .bind(variant_id)
            .bind(product_id)
            .execute(executor)
            .await?
        }
        None => {
            sqlx::query(
                r"
                UPDATE storefront.product
                SET stock_quantity = stock_quantity - $1, updated_at = NOW()
                WHERE id = $2 AND stock_quantity >= $1
                ",
            )
            .bind(quantity)
            .bind(product_id)
            .execute(executor)
            .await?
        }
    };
    Ok(result.rows_affected() == 1)
}

/// Repository for order reads and status changes.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// A user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM storefront.customer_order o
            WHERE o.user_id = $1
            ORDER BY o.created_at DESC
            "
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// One of a user's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        id: OrderId,
        user_id: UserId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order o \
             WHERE o.id = $1 AND o.user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        match order {
            Some(order) => Ok(self.with_items(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Any order, for the back-office.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<OrderWithItems>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order o WHERE o.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match order {
            Some(order) => Ok(self.with_items(vec![order]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Orders filtered by status, sorted and paged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &AdminOrderQuery) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r"
            SELECT {ORDER_COLUMNS}
            FROM storefront.customer_order o
            WHERE ($1::storefront.order_status IS NULL OR o.status = $1)
            ORDER BY {}
            LIMIT $2 OFFSET $3
            ",
            query.sort.order_by()
        ))
        .bind(query.status)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, RepositoryError> {
        self.list(&AdminOrderQuery {
            status: Some(status),
            limit: Some(crate::models::catalog::MAX_PAGE_SIZE),
            ..AdminOrderQuery::default()
        })
        .await
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Order>, RepositoryError> {
        self.list(&AdminOrderQuery {
            limit: Some(limit),
            ..AdminOrderQuery::default()
        })
        .await
    }

    /// Move an order to a new status, optionally recording the payment
    /// intent that settled it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Conflict` if the transition is not allowed.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        payment_intent_id: Option<&str>,
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current: OrderStatus = sqlx::query_scalar(
            "SELECT status FROM storefront.customer_order WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if !current.can_transition_to(status) {
            return Err(RepositoryError::Conflict(format!(
                "cannot change order status from {current} to {status}"
            )));
        }

        let order = sqlx::query_as::<_, Order>(&format!(
            r"
            UPDATE storefront.customer_order AS o
            SET status = $2,
                payment_intent_id = COALESCE($3, o.payment_intent_id),
                updated_at = NOW()
            WHERE o.id = $1
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status)
        .bind(payment_intent_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(order)
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, variant_id, product_name, variant_name,
                   quantity, unit_price
            FROM storefront.order_item
            WHERE order_id = ANY($1)
            ORDER BY created_at, id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| OrderWithItems {
                items: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }
}
