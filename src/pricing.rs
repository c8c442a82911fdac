//! Money helpers and the shipping tier table.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::ShippingRates;

/// Products whose name contains this marker are custom-order deposits and
/// always ship free.
const CUSTOM_ORDER_MARKER: &str = "custom order";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShippingTier {
    /// Subtotal under $50: $4.99.
    Under50,
    /// Subtotal from $50 up to $100: $7.99.
    Under100,
    Free,
}

impl ShippingTier {
    pub fn select(subtotal: Decimal, has_custom_order: bool) -> Self {
        if has_custom_order {
            return ShippingTier::Free;
        }
        if subtotal < Decimal::from(50) {
            ShippingTier::Under50
        } else if subtotal < Decimal::from(100) {
            ShippingTier::Under100
        } else {
            ShippingTier::Free
        }
    }

    pub fn rate_id(self, rates: &ShippingRates) -> &str {
        match self {
            ShippingTier::Under50 => &rates.under_50,
            ShippingTier::Under100 => &rates.under_100,
            ShippingTier::Free => &rates.free,
        }
    }
}

pub fn is_custom_order_item(product_name: &str) -> bool {
    product_name.to_lowercase().contains(CUSTOM_ORDER_MARKER)
}

/// Price in minor units (cents), rounded half away from zero.
pub fn minor_units(price: Decimal) -> Option<i64> {
    (price * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

pub fn line_total(price: Decimal, quantity: i32) -> Decimal {
    price * Decimal::from(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[rstest]
    #[case("0.00", false, ShippingTier::Under50)]
    #[case("49.99", false, ShippingTier::Under50)]
    #[case("50.00", false, ShippingTier::Under100)]
    #[case("99.99", false, ShippingTier::Under100)]
    #[case("100.00", false, ShippingTier::Free)]
    #[case("450.00", false, ShippingTier::Free)]
    #[case("10.00", true, ShippingTier::Free)]
    fn tier_boundaries(#[case] subtotal: &str, #[case] custom: bool, #[case] tier: ShippingTier) {
        assert_eq!(ShippingTier::select(dec(subtotal), custom), tier);
    }

    #[test]
    fn tiers_map_to_configured_rates() {
        let rates = ShippingRates {
            under_50: "shr_a".into(),
            under_100: "shr_b".into(),
            free: "shr_c".into(),
        };
        assert_eq!(ShippingTier::Under50.rate_id(&rates), "shr_a");
        assert_eq!(ShippingTier::Under100.rate_id(&rates), "shr_b");
        assert_eq!(ShippingTier::Free.rate_id(&rates), "shr_c");
    }

    #[test]
    fn custom_order_marker_is_case_insensitive() {
        assert!(is_custom_order_item("Custom Order Deposit"));
        assert!(is_custom_order_item("CUSTOM ORDER - 4ft"));
        assert!(!is_custom_order_item("Customary Rug"));
    }

    #[test]
    fn minor_units_round_to_cents() {
        assert_eq!(minor_units(dec("150.00")), Some(15000));
        assert_eq!(minor_units(dec("4.99")), Some(499));
        assert_eq!(minor_units(dec("0.005")), Some(1));
        assert_eq!(line_total(dec("7.50"), 3), dec("22.50"));
    }
}
