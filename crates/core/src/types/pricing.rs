//! Cart and order pricing.
//!
//! All amounts are [`Decimal`] in the store currency (USD), never floats.
//! The same [`CartTotals::compute`] is used to render the cart and to write
//! the order at checkout, so the customer is charged what they were shown.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Store-wide shipping and tax settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Flat shipping charge applied to any non-empty cart.
    pub flat_shipping: Decimal,
    /// Sales tax rate as a fraction (0.08 = 8%).
    pub tax_rate: Decimal,
}

impl PricingPolicy {
    /// Default flat shipping: $12.99.
    pub const DEFAULT_SHIPPING: Decimal = Decimal::from_parts(1299, 0, 0, false, 2);
    /// Default tax rate: 8%.
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

    /// Create a policy from explicit values.
    #[must_use]
    pub const fn new(flat_shipping: Decimal, tax_rate: Decimal) -> Self {
        Self {
            flat_shipping,
            tax_rate,
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHIPPING, Self::DEFAULT_TAX_RATE)
    }
}

/// Price the customer pays for one unit.
///
/// A variant's own price takes precedence over the product's; within each,
/// a sale price wins over the regular price.
#[must_use]
pub fn effective_unit_price(
    product_price: Decimal,
    product_sale_price: Option<Decimal>,
    variant_price: Option<Decimal>,
    variant_sale_price: Option<Decimal>,
) -> Decimal {
    variant_sale_price
        .or(variant_price)
        .or(product_sale_price)
        .unwrap_or(product_price)
}

/// One priced cart or order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl PricedLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Derived totals of a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CartTotals {
    /// Sum of quantities across all lines.
    pub item_count: i64,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartTotals {
    /// Compute totals for the given lines with no discount.
    #[must_use]
    pub fn compute(lines: &[PricedLine], policy: &PricingPolicy) -> Self {
        Self::compute_with_discount(lines, policy, Decimal::ZERO)
    }

    /// Compute totals for the given lines after a discount.
    ///
    /// The discount is clamped to `0..=subtotal`; tax is charged on the
    /// discounted subtotal and rounded half away from zero to cents.
    #[must_use]
    pub fn compute_with_discount(
        lines: &[PricedLine],
        policy: &PricingPolicy,
        discount: Decimal,
    ) -> Self {
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let subtotal: Decimal = lines.iter().map(PricedLine::line_total).sum();
        let discount = round_cents(discount.clamp(Decimal::ZERO, subtotal));
        let shipping = if lines.is_empty() {
            Decimal::ZERO
        } else {
            policy.flat_shipping
        };
        let tax = round_cents((subtotal - discount) * policy.tax_rate);
        let total = subtotal - discount + shipping + tax;

        Self {
            item_count,
            subtotal,
            discount,
            shipping,
            tax,
            total,
        }
    }
}

/// Round to two decimal places, half away from zero.
#[must_use]
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(price: &str, quantity: i32) -> PricedLine {
        PricedLine {
            unit_price: dec(price),
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_is_all_zero() {
        let totals = CartTotals::compute(&[], &PricingPolicy::default());
        assert_eq!(totals, CartTotals::default());
    }

    #[test]
    fn test_single_line() {
        let totals = CartTotals::compute(&[line("129.99", 1)], &PricingPolicy::default());
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.subtotal, dec("129.99"));
        assert_eq!(totals.shipping, dec("12.99"));
        // 129.99 * 0.08 = 10.3992
        assert_eq!(totals.tax, dec("10.40"));
        assert_eq!(totals.total, dec("153.38"));
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let totals = CartTotals::compute(
            &[line("10.00", 2), line("5.50", 3)],
            &PricingPolicy::default(),
        );
        assert_eq!(totals.item_count, 5);
        assert_eq!(totals.subtotal, dec("36.50"));
        assert_eq!(totals.tax, dec("2.92"));
        assert_eq!(totals.total, dec("52.41"));
    }

    #[test]
    fn test_shipping_is_flat_regardless_of_size() {
        let small = CartTotals::compute(&[line("1.00", 1)], &PricingPolicy::default());
        let large = CartTotals::compute(&[line("1.00", 40)], &PricingPolicy::default());
        assert_eq!(small.shipping, large.shipping);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 0.10 * 0.05 = 0.005 -> 0.01
        let policy = PricingPolicy::new(Decimal::ZERO, dec("0.05"));
        let totals = CartTotals::compute(&[line("0.10", 1)], &policy);
        assert_eq!(totals.tax, dec("0.01"));
    }

    #[test]
    fn test_discount_reduces_taxable_amount() {
        let totals = CartTotals::compute_with_discount(
            &[line("100.00", 1)],
            &PricingPolicy::default(),
            dec("20.00"),
        );
        assert_eq!(totals.discount, dec("20.00"));
        assert_eq!(totals.tax, dec("6.40"));
        assert_eq!(totals.total, dec("99.39"));
    }

    #[test]
    fn test_discount_never_exceeds_subtotal() {
        let totals = CartTotals::compute_with_discount(
            &[line("15.00", 1)],
            &PricingPolicy::default(),
            dec("50.00"),
        );
        assert_eq!(totals.discount, dec("15.00"));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec("12.99"));
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy::new(Decimal::ZERO, dec("0.10"));
        let totals = CartTotals::compute(&[line("50.00", 2)], &policy);
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, dec("10.00"));
        assert_eq!(totals.total, dec("110.00"));
    }

    #[test]
    fn test_effective_unit_price_precedence() {
        let base = dec("100.00");
        assert_eq!(effective_unit_price(base, None, None, None), base);
        assert_eq!(
            effective_unit_price(base, Some(dec("80.00")), None, None),
            dec("80.00")
        );
        assert_eq!(
            effective_unit_price(base, Some(dec("80.00")), Some(dec("110.00")), None),
            dec("110.00")
        );
        assert_eq!(
            effective_unit_price(
                base,
                Some(dec("80.00")),
                Some(dec("110.00")),
                Some(dec("95.00"))
            ),
            dec("95.00")
        );
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(PricingPolicy::DEFAULT_SHIPPING, dec("12.99"));
        assert_eq!(PricingPolicy::DEFAULT_TAX_RATE, dec("0.08"));
    }
}
