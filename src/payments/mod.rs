//! Payment gateway port.
//!
//! The storefront only needs two gateway calls: open a hosted checkout
//! session and read one back after the customer returns. Everything else
//! (pricing rules, stock, settlement) lives on our side.

pub mod stripe;
pub mod webhook;

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::stock::{LocalQuantities, parse_overrides};

pub use stripe::StripeGateway;

pub const METADATA_CART_ID: &str = "cart_id";
pub const METADATA_LOCAL_QUANTITIES: &str = "local_quantities";
/// Placeholder the gateway substitutes with the session id in redirect URLs.
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected gateway response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("gateway session {0} has no checkout url")]
    MissingUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub name: String,
    /// Unit price in minor currency units.
    pub unit_amount: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub currency: String,
    pub line_items: Vec<LineItem>,
    pub shipping_rate: String,
    pub allowed_countries: Vec<String>,
    pub success_url: String,
    pub cancel_url: String,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: String,
    pub url: String,
}

/// A checkout session as read back from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySession {
    pub id: String,
    pub payment_status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl GatewaySession {
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// `Err` when metadata carries a cart id that is not a UUID.
    pub fn cart_id(&self) -> Result<Option<Uuid>, uuid::Error> {
        self.metadata
            .get(METADATA_CART_ID)
            .filter(|raw| !raw.is_empty())
            .map(|raw| Uuid::parse_str(raw))
            .transpose()
    }

    pub fn local_quantities(&self) -> LocalQuantities {
        parse_overrides(
            self.metadata
                .get(METADATA_LOCAL_QUANTITIES)
                .map(String::as_str),
        )
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        request: &NewCheckoutSession,
    ) -> Result<CreatedSession, GatewayError>;

    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(metadata: &[(&str, &str)]) -> GatewaySession {
        GatewaySession {
            id: "cs_test".into(),
            payment_status: "paid".into(),
            metadata: metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn cart_id_is_optional_but_must_parse() {
        assert_eq!(session(&[]).cart_id().unwrap(), None);

        let id = Uuid::new_v4();
        let s = session(&[(METADATA_CART_ID, &id.to_string())]);
        assert_eq!(s.cart_id().unwrap(), Some(id));

        assert!(session(&[(METADATA_CART_ID, "42")]).cart_id().is_err());
    }

    #[test]
    fn unpaid_statuses() {
        let mut s = session(&[]);
        assert!(s.is_paid());
        s.payment_status = "unpaid".into();
        assert!(!s.is_paid());
        s.payment_status = "no_payment_required".into();
        assert!(!s.is_paid());
    }
}
