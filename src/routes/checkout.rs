use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use secrecy::ExposeSecret;
use tower_sessions::Session;

use crate::{
    dto::checkout::{
        CheckoutSessionCreated, CreateCheckoutRequest, SettleRequest, SettlementOutcome,
        WebhookAck,
    },
    error::{AppError, AppResult},
    middleware::cart_session::{ensure_cart_key, existing_cart_key},
    payments::webhook::{SIGNATURE_HEADER, WebhookError, WebhookEvent, verify_signature},
    response::ApiResponse,
    services::{
        checkout_service,
        settlement_service::{self, SettlementCaller},
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/session", post(create_session))
        .route("/success", post(checkout_success))
        .route("/webhook", post(gateway_webhook))
}

#[utoipa::path(
    post,
    path = "/api/checkout/session",
    request_body = CreateCheckoutRequest,
    responses(
        (status = 200, description = "Hosted checkout opened", body = ApiResponse<CheckoutSessionCreated>),
        (status = 400, description = "Empty cart or items exceed stock"),
        (status = 502, description = "Payment gateway error"),
    ),
    tag = "Checkout"
)]
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
    payload: Option<Json<CreateCheckoutRequest>>,
) -> AppResult<Json<ApiResponse<CheckoutSessionCreated>>> {
    let key = ensure_cart_key(&session).await?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let resp = checkout_service::create_checkout_session(&state, &key, payload).await?;
    Ok(Json(resp))
}

fn outcome_message(outcome: &SettlementOutcome) -> &'static str {
    if outcome.already_processed {
        "Payment already processed"
    } else if outcome.deductions.is_empty() {
        "Empty Cart - No items found in cart"
    } else {
        "Payment verified and stock updated"
    }
}

#[utoipa::path(
    post,
    path = "/api/checkout/success",
    request_body = SettleRequest,
    responses(
        (status = 200, description = "Stock settled, already processed, or empty cart", body = ApiResponse<SettlementOutcome>),
        (status = 400, description = "Missing session, unpaid, or insufficient stock"),
        (status = 403, description = "Cart belongs to another session"),
        (status = 404, description = "Cart not found"),
    ),
    tag = "Checkout"
)]
pub async fn checkout_success(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<SettleRequest>,
) -> AppResult<Json<ApiResponse<SettlementOutcome>>> {
    let key = existing_cart_key(&session)
        .await?
        .ok_or_else(|| AppError::BadRequest("No active session key found".into()))?;

    let outcome = settlement_service::settle(
        &state,
        SettlementCaller::Browser { session_key: &key },
        &payload.session_id,
    )
    .await?;
    Ok(Json(ApiResponse::single(outcome_message(&outcome), outcome)))
}

#[utoipa::path(
    post,
    path = "/api/checkout/webhook",
    request_body(content = String, description = "Raw gateway event JSON"),
    params(("Stripe-Signature" = String, Header, description = "t=<unix>,v1=<hex hmac>")),
    responses(
        (status = 200, description = "Event handled or ignored", body = ApiResponse<WebhookAck>),
        (status = 400, description = "Bad signature or payload"),
    ),
    tag = "Checkout"
)]
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<WebhookAck>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    verify_signature(
        &body,
        signature,
        state.payments.webhook_secret.expose_secret(),
        chrono::Utc::now().timestamp(),
    )?;

    let event = WebhookEvent::parse(&body)?;
    let Some(session_id) = event.completed_session_id() else {
        tracing::debug!(event_type = %event.kind, "webhook event ignored");
        return Ok(Json(ApiResponse::single(
            "Event ignored",
            WebhookAck {
                event_type: event.kind,
                settled: false,
            },
        )));
    };

    let outcome = settlement_service::settle(&state, SettlementCaller::Gateway, session_id).await?;
    Ok(Json(ApiResponse::single(
        outcome_message(&outcome),
        WebhookAck {
            event_type: event.kind.clone(),
            settled: !outcome.already_processed && !outcome.deductions.is_empty(),
        },
    )))
}
