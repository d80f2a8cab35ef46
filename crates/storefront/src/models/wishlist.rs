//! Wishlist entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use abamade_core::{ProductId, WishlistItemId};

/// A saved product with enough detail to render a wishlist card.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WishlistEntry {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub added_at: DateTime<Utc>,
}
