//! Orders and order lines.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use abamade_core::{
    AddressId, CouponId, OrderId, OrderItemId, OrderStatus, ProductId, UserId, VariantId,
};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub coupon_id: Option<CouponId>,
    pub payment_intent_id: Option<String>,
    pub shipping_address_id: Option<AddressId>,
    pub billing_address_id: Option<AddressId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchased line. Name and price are copied at checkout so later catalog
/// edits do not rewrite order history.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub variant_id: Option<VariantId>,
    pub product_name: String,
    pub variant_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}
