//! Stock rules shared by the cart, checkout and settlement paths.
//!
//! Everything here is pure: callers load quantities under the appropriate
//! row locks and feed them in.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-product quantities the storefront sent at checkout, overriding the
/// stored cart quantities.
pub type LocalQuantities = HashMap<Uuid, i32>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("quantity must be greater than 0")]
    InvalidQuantity,

    #[error("Only {available} available")]
    Exceeds { available: i32 },

    #[error("Cannot add {requested} more. Only {remaining} available")]
    ExceedsRemaining { requested: i32, remaining: i32 },
}

/// A cart line whose quantity exceeds current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StockShortfall {
    pub product_id: Uuid,
    pub product_name: String,
    pub requested: i32,
    pub available: i32,
}

/// A cart line paired with the product's current stock.
#[derive(Debug, Clone)]
pub struct StockLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub cart_quantity: i32,
    pub available: i32,
}

/// Quantity of a line after adding `requested` units to what the cart holds.
pub fn merged_quantity(
    existing: Option<i32>,
    requested: i32,
    available: i32,
) -> Result<i32, StockError> {
    if requested <= 0 {
        return Err(StockError::InvalidQuantity);
    }
    match existing {
        None if requested > available => Err(StockError::Exceeds { available }),
        None => Ok(requested),
        Some(current) => {
            let merged = current.saturating_add(requested);
            if merged > available {
                Err(StockError::ExceedsRemaining {
                    requested,
                    remaining: (available - current).max(0),
                })
            } else {
                Ok(merged)
            }
        }
    }
}

/// Quantity of a line when the caller sets it outright.
pub fn replacement_quantity(requested: i32, available: i32) -> Result<i32, StockError> {
    if requested <= 0 {
        return Err(StockError::InvalidQuantity);
    }
    if requested > available {
        return Err(StockError::Exceeds { available });
    }
    Ok(requested)
}

pub fn effective_quantity(product_id: Uuid, cart_quantity: i32, overrides: &LocalQuantities) -> i32 {
    overrides.get(&product_id).copied().unwrap_or(cart_quantity)
}

/// Every line whose effective quantity exceeds stock, in input order.
pub fn shortfalls(lines: &[StockLine], overrides: &LocalQuantities) -> Vec<StockShortfall> {
    lines
        .iter()
        .filter_map(|line| {
            let requested = effective_quantity(line.product_id, line.cart_quantity, overrides);
            (requested > line.available).then(|| StockShortfall {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                requested,
                available: line.available,
            })
        })
        .collect()
}

/// Overrides must be positive; a zero or negative override is a client bug.
pub fn validate_overrides(overrides: &LocalQuantities) -> Result<(), StockError> {
    if overrides.values().any(|q| *q <= 0) {
        return Err(StockError::InvalidQuantity);
    }
    Ok(())
}

/// Parse the overrides echoed back through gateway metadata. Malformed JSON
/// yields no overrides, falling back to cart quantities.
pub fn parse_overrides(raw: Option<&str>) -> LocalQuantities {
    raw.and_then(|s| serde_json::from_str::<LocalQuantities>(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 2, 5, Ok(2))]
    #[case(None, 5, 5, Ok(5))]
    #[case(None, 6, 5, Err(StockError::Exceeds { available: 5 }))]
    #[case(Some(2), 3, 5, Ok(5))]
    #[case(Some(4), 2, 5, Err(StockError::ExceedsRemaining { requested: 2, remaining: 1 }))]
    #[case(Some(1), 0, 5, Err(StockError::InvalidQuantity))]
    #[case(None, -1, 5, Err(StockError::InvalidQuantity))]
    fn merged_quantity_cases(
        #[case] existing: Option<i32>,
        #[case] requested: i32,
        #[case] available: i32,
        #[case] expected: Result<i32, StockError>,
    ) {
        assert_eq!(merged_quantity(existing, requested, available), expected);
    }

    #[test]
    fn merged_quantity_never_exceeds_stock() {
        for available in 0..6 {
            for existing in [None, Some(1), Some(3)] {
                for requested in 1..8 {
                    if let Ok(q) = merged_quantity(existing, requested, available) {
                        assert!(q <= available);
                    }
                }
            }
        }
    }

    #[test]
    fn remaining_is_clamped_when_stock_dropped_below_line() {
        let err = merged_quantity(Some(4), 1, 2).unwrap_err();
        assert_eq!(err.to_string(), "Cannot add 1 more. Only 0 available");
    }

    #[test]
    fn replacement_checks_stock() {
        assert_eq!(replacement_quantity(3, 3), Ok(3));
        assert_eq!(
            replacement_quantity(4, 3),
            Err(StockError::Exceeds { available: 3 })
        );
        assert_eq!(replacement_quantity(0, 3), Err(StockError::InvalidQuantity));
    }

    #[test]
    fn shortfalls_use_overrides() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let lines = vec![
            StockLine {
                product_id: a,
                product_name: "Octopus".into(),
                cart_quantity: 1,
                available: 2,
            },
            StockLine {
                product_id: b,
                product_name: "Anchor".into(),
                cart_quantity: 1,
                available: 1,
            },
        ];

        assert!(shortfalls(&lines, &LocalQuantities::new()).is_empty());

        let overrides = LocalQuantities::from([(a, 3)]);
        let found = shortfalls(&lines, &overrides);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_id, a);
        assert_eq!(found[0].requested, 3);
        assert_eq!(found[0].available, 2);
    }

    #[test]
    fn malformed_override_metadata_is_ignored() {
        assert!(parse_overrides(Some("not json")).is_empty());
        assert!(parse_overrides(None).is_empty());

        let id = Uuid::new_v4();
        let raw = format!("{{\"{id}\": 2}}");
        assert_eq!(parse_overrides(Some(&raw)).get(&id), Some(&2));
    }

    #[test]
    fn non_positive_overrides_are_rejected() {
        let overrides = LocalQuantities::from([(Uuid::new_v4(), 0)]);
        assert_eq!(
            validate_overrides(&overrides),
            Err(StockError::InvalidQuantity)
        );
    }
}
