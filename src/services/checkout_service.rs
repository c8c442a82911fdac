use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    config::{PaymentConfig, ShippingRates},
    dto::checkout::{CheckoutSessionCreated, CreateCheckoutRequest},
    error::{AppError, AppResult},
    payments::{
        LineItem, METADATA_CART_ID, METADATA_LOCAL_QUANTITIES, NewCheckoutSession,
        SESSION_ID_PLACEHOLDER,
    },
    pricing::{ShippingTier, is_custom_order_item, line_total, minor_units},
    response::ApiResponse,
    services::cart_service::{CartLine, cart_lines, resolve_cart},
    state::AppState,
    stock::{LocalQuantities, effective_quantity, shortfalls, validate_overrides},
};

pub const STOCK_EXCEEDED_MESSAGE: &str = "Some items in your cart exceed available stock";

/// Gateway request for a cart, or the reason it cannot be checked out.
pub fn build_session_request(
    cart_id: Uuid,
    lines: &[CartLine],
    overrides: &LocalQuantities,
    payments: &PaymentConfig,
    shipping: &ShippingRates,
) -> AppResult<(NewCheckoutSession, ShippingTier)> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let stock_lines: Vec<_> = lines.iter().map(CartLine::stock_line).collect();
    let short = shortfalls(&stock_lines, overrides);
    if !short.is_empty() {
        return Err(AppError::insufficient_stock(STOCK_EXCEEDED_MESSAGE, short));
    }

    let mut subtotal = Decimal::ZERO;
    let mut line_items = Vec::with_capacity(lines.len());
    for line in lines {
        let quantity = effective_quantity(line.product_id, line.quantity, overrides);
        let unit_amount = minor_units(line.price).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("price of {} out of range", line.product_id))
        })?;
        subtotal += line_total(line.price, quantity);
        line_items.push(LineItem {
            name: line.name.clone(),
            unit_amount,
            quantity,
        });
    }

    let has_custom_order = lines.iter().any(|line| is_custom_order_item(&line.name));
    let tier = ShippingTier::select(subtotal, has_custom_order);

    let mut metadata = BTreeMap::new();
    metadata.insert(METADATA_CART_ID.to_string(), cart_id.to_string());
    metadata.insert(
        METADATA_LOCAL_QUANTITIES.to_string(),
        serde_json::to_string(overrides).map_err(anyhow::Error::from)?,
    );

    let request = NewCheckoutSession {
        currency: payments.currency.clone(),
        line_items,
        shipping_rate: tier.rate_id(shipping).to_string(),
        allowed_countries: payments.allowed_countries.clone(),
        success_url: success_url(&payments.success_url, cart_id),
        cancel_url: payments.cancel_url.clone(),
        metadata,
    };
    Ok((request, tier))
}

fn success_url(base: &str, cart_id: Uuid) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}session_id={SESSION_ID_PLACEHOLDER}&cart_id={cart_id}")
}

pub async fn create_checkout_session(
    state: &AppState,
    session_key: &str,
    payload: CreateCheckoutRequest,
) -> AppResult<ApiResponse<CheckoutSessionCreated>> {
    validate_overrides(&payload.local_quantities)?;

    let cart = resolve_cart(state, session_key).await?;
    let lines = cart_lines(&state.pool, cart.id).await?;
    let (request, tier) = build_session_request(
        cart.id,
        &lines,
        &payload.local_quantities,
        &state.payments,
        &state.shipping,
    )?;

    let created = state.gateway.create_session(&request).await?;
    tracing::info!(
        cart_id = %cart.id,
        session_id = %created.id,
        shipping_tier = ?tier,
        lines = request.line_items.len(),
        "checkout session created"
    );

    Ok(ApiResponse::single(
        "Checkout session created",
        CheckoutSessionCreated {
            checkout_url: created.url,
            session_id: created.id,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn line(name: &str, price: &str, quantity: i32, available: i32) -> CartLine {
        CartLine {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity,
            name: name.into(),
            dimensions: "2x3 ft".into(),
            price: Decimal::from_str(price).unwrap(),
            available,
        }
    }

    fn build(
        lines: &[CartLine],
        overrides: &LocalQuantities,
    ) -> AppResult<(NewCheckoutSession, ShippingTier)> {
        build_session_request(
            Uuid::nil(),
            lines,
            overrides,
            &PaymentConfig::default(),
            &ShippingRates::default(),
        )
    }

    #[test]
    fn empty_cart_is_rejected() {
        let err = build(&[], &LocalQuantities::new()).unwrap_err();
        assert_eq!(err.to_string(), "Cart is empty");
    }

    #[test]
    fn shortfall_lists_offending_lines() {
        let lines = vec![line("Octopus", "40.00", 2, 1), line("Anchor", "10.00", 1, 5)];
        match build(&lines, &LocalQuantities::new()) {
            Err(AppError::InsufficientStock { message, items }) => {
                assert_eq!(message, STOCK_EXCEEDED_MESSAGE);
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].product_name, "Octopus");
            }
            other => panic!("expected shortfall, got {other:?}"),
        }
    }

    #[test]
    fn overrides_drive_quantities_and_tier() {
        let lines = vec![line("Sea Turtle", "30.00", 1, 4)];
        let overrides = LocalQuantities::from([(lines[0].product_id, 3)]);

        let (request, tier) = build(&lines, &overrides).unwrap();
        assert_eq!(request.line_items[0].quantity, 3);
        assert_eq!(request.line_items[0].unit_amount, 3000);
        assert_eq!(tier, ShippingTier::Under100);
        assert_eq!(request.shipping_rate, "shr_under_100");

        let echoed = crate::stock::parse_overrides(
            request.metadata.get(METADATA_LOCAL_QUANTITIES).map(String::as_str),
        );
        assert_eq!(echoed, overrides);
    }

    #[test]
    fn custom_order_ships_free() {
        let lines = vec![line("Custom Order Deposit", "20.00", 1, 1)];
        let (request, tier) = build(&lines, &LocalQuantities::new()).unwrap();
        assert_eq!(tier, ShippingTier::Free);
        assert_eq!(request.shipping_rate, "shr_free");
    }

    #[test]
    fn success_url_carries_placeholder_and_cart() {
        let cart = Uuid::new_v4();
        assert_eq!(
            success_url("https://shop.test/done", cart),
            format!("https://shop.test/done?session_id={{CHECKOUT_SESSION_ID}}&cart_id={cart}")
        );
        assert!(success_url("https://shop.test/done?x=1", cart).starts_with("https://shop.test/done?x=1&"));
    }
}
