//! Stripe Checkout adapter over `reqwest`.
//!
//! Stripe's REST API takes form-encoded bodies with bracketed keys for
//! nested parameters, so the request is flattened by hand.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use super::{CreatedSession, GatewayError, GatewaySession, NewCheckoutSession, PaymentGateway};
use crate::config::PaymentConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    api_base: String,
    secret_key: SecretString,
}

#[derive(Deserialize)]
struct StripeSession {
    id: String,
    url: Option<String>,
}

#[derive(Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Deserialize)]
struct StripeErrorDetail {
    message: String,
}

impl StripeGateway {
    pub fn new(config: &PaymentConfig) -> Result<Self, GatewayError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn sessions_url(&self) -> String {
        format!("{}/v1/checkout/sessions", self.api_base)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Flatten a checkout request into Stripe's bracketed form fields.
pub fn session_form(request: &NewCheckoutSession) -> Vec<(String, String)> {
    let mut form = vec![
        ("mode".to_string(), "payment".to_string()),
        ("payment_method_types[0]".to_string(), "card".to_string()),
        ("automatic_tax[enabled]".to_string(), "true".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (
            "shipping_options[0][shipping_rate]".to_string(),
            request.shipping_rate.clone(),
        ),
    ];

    for (i, country) in request.allowed_countries.iter().enumerate() {
        form.push((
            format!("shipping_address_collection[allowed_countries][{i}]"),
            country.clone(),
        ));
    }

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{i}]");
        form.push((
            format!("{prefix}[price_data][currency]"),
            request.currency.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][product_data][name]"),
            item.name.clone(),
        ));
        form.push((
            format!("{prefix}[price_data][unit_amount]"),
            item.unit_amount.to_string(),
        ));
        form.push((format!("{prefix}[quantity]"), item.quantity.to_string()));
    }

    for (key, value) in &request.metadata {
        form.push((format!("metadata[{key}]"), value.clone()));
    }

    form
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip_all, fields(items = request.line_items.len()))]
    async fn create_session(
        &self,
        request: &NewCheckoutSession,
    ) -> Result<CreatedSession, GatewayError> {
        let response = self
            .client
            .post(self.sessions_url())
            .bearer_auth(self.secret_key.expose_secret())
            .form(&session_form(request))
            .send()
            .await?;

        let session: StripeSession = Self::decode(response).await?;
        debug!(session_id = %session.id, "checkout session created");
        let url = session
            .url
            .ok_or_else(|| GatewayError::MissingUrl(session.id.clone()))?;
        Ok(CreatedSession {
            id: session.id,
            url,
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError> {
        let response = self
            .client
            .get(format!("{}/{}", self.sessions_url(), session_id))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::payments::LineItem;

    fn lookup<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn form_flattens_nested_parameters() {
        let request = NewCheckoutSession {
            currency: "usd".into(),
            line_items: vec![
                LineItem {
                    name: "Whale Rug".into(),
                    unit_amount: 15000,
                    quantity: 1,
                },
                LineItem {
                    name: "Coaster".into(),
                    unit_amount: 899,
                    quantity: 4,
                },
            ],
            shipping_rate: "shr_free".into(),
            allowed_countries: vec!["US".into(), "CA".into()],
            success_url: "https://shop.test/ok?session_id={CHECKOUT_SESSION_ID}".into(),
            cancel_url: "https://shop.test/cancel".into(),
            metadata: BTreeMap::from([("cart_id".to_string(), "abc".to_string())]),
        };

        let form = session_form(&request);
        assert_eq!(lookup(&form, "mode"), Some("payment"));
        assert_eq!(
            lookup(&form, "line_items[1][price_data][unit_amount]"),
            Some("899")
        );
        assert_eq!(lookup(&form, "line_items[1][quantity]"), Some("4"));
        assert_eq!(
            lookup(&form, "line_items[0][price_data][product_data][name]"),
            Some("Whale Rug")
        );
        assert_eq!(
            lookup(&form, "shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );
        assert_eq!(
            lookup(&form, "shipping_options[0][shipping_rate]"),
            Some("shr_free")
        );
        assert_eq!(lookup(&form, "metadata[cart_id]"), Some("abc"));
    }

    #[test]
    fn retrieved_session_parses_metadata() {
        let raw = r#"{
            "id": "cs_test_123",
            "object": "checkout.session",
            "payment_status": "paid",
            "metadata": {"cart_id": "9f1c3f0e-8d8b-4c55-9b8e-0f8d1d7f2a10", "local_quantities": "{}"}
        }"#;
        let session: GatewaySession = serde_json::from_str(raw).unwrap();
        assert!(session.is_paid());
        assert!(session.cart_id().unwrap().is_some());
        assert!(session.local_quantities().is_empty());
    }

    #[test]
    fn session_url_is_joined_without_double_slash() {
        let config = PaymentConfig {
            api_base: "https://api.stripe.test/".into(),
            ..PaymentConfig::default()
        };
        let gateway = StripeGateway::new(&config).unwrap();
        assert_eq!(
            gateway.sessions_url(),
            "https://api.stripe.test/v1/checkout/sessions"
        );
    }
}
