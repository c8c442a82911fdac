//! Gateway webhook signature verification and event parsing.
//!
//! Header format: `t=<unix seconds>,v1=<hex hmac>[,v1=...]`, where the HMAC
//! is SHA-256 over `"{t}.{raw body}"` keyed with the endpoint secret.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "stripe-signature";
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("missing signature header")]
    MissingSignature,

    #[error("malformed signature header")]
    MalformedHeader,

    #[error("webhook secret is not configured")]
    NotConfigured,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("invalid event payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    pub fn parse(payload: &[u8]) -> Result<Self, WebhookError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Session id of a completed checkout; `None` for any other event.
    pub fn completed_session_id(&self) -> Option<&str> {
        if self.kind != CHECKOUT_COMPLETED {
            return None;
        }
        self.data.object.get("id").and_then(|id| id.as_str())
    }
}

/// Verify `header` against `payload` at time `now` (unix seconds).
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), WebhookError> {
    if secret.is_empty() {
        return Err(WebhookError::NotConfigured);
    }

    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(WebhookError::MalformedHeader)?;
    if signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }
    if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(WebhookError::Expired);
    }

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::NotConfigured)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        Err(WebhookError::SignatureMismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test123secret456";
    const NOW: i64 = 1_760_000_000;

    fn sign(payload: &[u8], secret: &str, timestamp: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_is_accepted() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, SECRET, NOW);
        assert!(verify_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = br#"{"type":"checkout.session.completed"}"#;
        let header = sign(payload, "wrong_secret", NOW);
        assert!(matches!(
            verify_signature(payload, &header, SECRET, NOW),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn modified_payload_is_rejected() {
        let header = sign(br#"{"a":1}"#, SECRET, NOW);
        assert!(matches!(
            verify_signature(br#"{"a":2}"#, &header, SECRET, NOW),
            Err(WebhookError::SignatureMismatch)
        ));
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let payload = b"{}";
        let header = sign(payload, SECRET, NOW - 600);
        assert!(matches!(
            verify_signature(payload, &header, SECRET, NOW),
            Err(WebhookError::Expired)
        ));
    }

    #[test]
    fn any_matching_v1_is_enough() {
        let payload = b"{}";
        let good = sign(payload, SECRET, NOW);
        let v1 = good.split_once(",v1=").unwrap().1;
        let header = format!("t={NOW},v1=deadbeef,v1={v1}");
        assert!(verify_signature(payload, &header, SECRET, NOW).is_ok());
    }

    #[test]
    fn header_without_timestamp_is_malformed() {
        assert!(matches!(
            verify_signature(b"{}", "v1=abcd", SECRET, NOW),
            Err(WebhookError::MalformedHeader)
        ));
        assert!(matches!(
            verify_signature(b"{}", "t=1,v1=abcd", "", NOW),
            Err(WebhookError::NotConfigured)
        ));
    }

    #[test]
    fn completed_session_id_only_for_checkout_completed() {
        let completed = WebhookEvent::parse(
            br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#,
        )
        .unwrap();
        assert_eq!(completed.completed_session_id(), Some("cs_1"));

        let other = WebhookEvent::parse(
            br#"{"type":"payment_intent.created","data":{"object":{"id":"pi_1"}}}"#,
        )
        .unwrap();
        assert_eq!(other.completed_session_id(), None);
    }
}
