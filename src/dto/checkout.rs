use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::stock::LocalQuantities;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCheckoutRequest {
    /// Product id to quantity, overriding stored cart quantities.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub local_quantities: LocalQuantities,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutSessionCreated {
    pub checkout_url: String,
    pub session_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettleRequest {
    #[serde(default)]
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Deduction {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity_deducted: i32,
    pub original_stock: i32,
    pub remaining_stock: i32,
    #[schema(value_type = String)]
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SettlementOutcome {
    pub session_id: String,
    /// The session was settled by an earlier call; nothing was deducted now.
    pub already_processed: bool,
    pub deductions: Vec<Deduction>,
}

impl SettlementOutcome {
    pub fn already_processed(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            already_processed: true,
            deductions: Vec::new(),
        }
    }

    pub fn settled(session_id: &str, deductions: Vec<Deduction>) -> Self {
        Self {
            session_id: session_id.to_string(),
            already_processed: false,
            deductions,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub event_type: String,
    pub settled: bool,
}
