use axum::{Json, Router, extract::State, http::StatusCode, routing::post};

use crate::{
    dto::newsletter::{NewsletterSendReport, SendNewsletterRequest, SubscribeRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::NewsletterSubscriber,
    response::ApiResponse,
    services::newsletter_service::{self, Subscription},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/subscribe", post(subscribe))
        .route("/unsubscribe", post(unsubscribe))
}

#[utoipa::path(
    post,
    path = "/api/newsletter/subscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 201, description = "Subscribed", body = ApiResponse<NewsletterSubscriber>),
        (status = 200, description = "Already subscribed", body = ApiResponse<NewsletterSubscriber>),
        (status = 400, description = "Invalid email address"),
    ),
    tag = "Newsletter"
)]
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<NewsletterSubscriber>>)> {
    let (outcome, subscriber) = newsletter_service::subscribe(&state, &payload.email).await?;
    let (status, message) = match outcome {
        Subscription::Created => (StatusCode::CREATED, "Subscribed to the newsletter"),
        Subscription::Renewed => (StatusCode::OK, "Welcome back to the newsletter"),
        Subscription::AlreadySubscribed => (StatusCode::OK, "Email is already subscribed"),
    };
    Ok((status, Json(ApiResponse::single(message, subscriber))))
}

#[utoipa::path(
    post,
    path = "/api/newsletter/unsubscribe",
    request_body = SubscribeRequest,
    responses(
        (status = 200, description = "Unsubscribed", body = ApiResponse<NewsletterSubscriber>),
        (status = 404, description = "Email not found in our subscription list."),
    ),
    tag = "Newsletter"
)]
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> AppResult<Json<ApiResponse<NewsletterSubscriber>>> {
    let subscriber = newsletter_service::unsubscribe(&state, &payload.email).await?;
    Ok(Json(ApiResponse::single(
        "Unsubscribed from the newsletter",
        subscriber,
    )))
}

#[utoipa::path(
    post,
    path = "/api/admin/newsletter/send",
    request_body = SendNewsletterRequest,
    responses(
        (status = 200, description = "Newsletter sent", body = ApiResponse<NewsletterSendReport>),
        (status = 400, description = "No subscribers"),
        (status = 403, description = "Forbidden"),
        (status = 429, description = "A newsletter was already sent in the last 24 hours"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn send_newsletter(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SendNewsletterRequest>,
) -> AppResult<Json<ApiResponse<NewsletterSendReport>>> {
    let report = newsletter_service::send_newsletter(&state, &user, payload).await?;
    let message = format!("Newsletter sent to {} subscribers", report.delivered);
    Ok(Json(ApiResponse::single(message, report)))
}
