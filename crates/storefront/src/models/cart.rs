//! Cart view types.

use rust_decimal::Decimal;
use serde::Serialize;

use abamade_core::{CartItemId, CartTotals, PricedLine, PricingPolicy, ProductId, VariantId};

/// One line of a cart, joined with the product and variant it refers to.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub variant_id: Option<VariantId>,
    pub variant_name: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub line_total: Decimal,
}

impl CartLine {
    #[must_use]
    pub const fn priced(&self) -> PricedLine {
        PricedLine {
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}

/// A cart with its derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub totals: CartTotals,
}

impl CartView {
    /// Compute totals for the given lines.
    #[must_use]
    pub fn new(items: Vec<CartLine>, policy: &PricingPolicy) -> Self {
        let priced: Vec<PricedLine> = items.iter().map(CartLine::priced).collect();
        let totals = CartTotals::compute(&priced, policy);
        Self { items, totals }
    }

    /// An empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            totals: CartTotals::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: &str, quantity: i32) -> CartLine {
        let unit_price: Decimal = price.parse().unwrap();
        CartLine {
            id: CartItemId::generate(),
            product_id: ProductId::generate(),
            product_name: "Classic Ballet Flats".to_owned(),
            product_slug: "classic-ballet-flats".to_owned(),
            image_url: None,
            variant_id: None,
            variant_name: None,
            unit_price,
            quantity,
            line_total: unit_price * Decimal::from(quantity),
        }
    }

    #[test]
    fn test_view_totals_follow_lines() {
        let view = CartView::new(vec![line("89.99", 2)], &PricingPolicy::default());
        assert_eq!(view.totals.item_count, 2);
        assert_eq!(view.totals.subtotal, "179.98".parse::<Decimal>().unwrap());
        assert_eq!(view.totals.shipping, PricingPolicy::DEFAULT_SHIPPING);
    }

    #[test]
    fn test_empty_view_has_no_shipping() {
        let view = CartView::new(Vec::new(), &PricingPolicy::default());
        assert_eq!(view.totals.shipping, Decimal::ZERO);
        assert!(CartView::empty().items.is_empty());
    }
}
