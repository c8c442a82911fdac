use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::{
    payments::{GatewayError, webhook::WebhookError},
    response::{ApiResponse, Meta},
    stock::{StockError, StockShortfall},
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    NotFoundMsg(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{message}")]
    InsufficientStock {
        message: String,
        items: Vec<StockShortfall>,
    },

    #[error("Cart does not belong to this session")]
    CartMismatch,

    #[error("Payment status is {0}, not 'paid'")]
    PaymentNotCompleted(String),

    #[error("Payment gateway error")]
    Gateway(#[from] GatewayError),

    #[error("Invalid webhook: {0}")]
    Webhook(#[from] WebhookError),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Session error")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stock shortfall at checkout or settlement time.
    pub fn insufficient_stock(message: impl Into<String>, items: Vec<StockShortfall>) -> Self {
        AppError::InsufficientStock {
            message: message.into(),
            items,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::NotFoundMsg(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_)
            | AppError::InsufficientStock { .. }
            | AppError::PaymentNotCompleted(_)
            | AppError::Webhook(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::CartMismatch => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::DbError(_)
            | AppError::OrmError(_)
            | AppError::Session(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Vec<StockShortfall>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }

        let message = self.to_string();
        let items = match self {
            AppError::InsufficientStock { items, .. } => Some(items),
            _ => None,
        };

        let body = ApiResponse {
            message: message.clone(),
            data: Some(ErrorData {
                error: message,
                items,
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn stock_errors_are_client_errors() {
        let err = AppError::insufficient_stock(
            "Some items in your cart exceed available stock",
            vec![StockShortfall {
                product_id: Uuid::new_v4(),
                product_name: "Sea Turtle Rug".into(),
                requested: 3,
                available: 1,
            }],
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Some items in your cart exceed available stock"
        );
    }

    #[test]
    fn gateway_and_ownership_statuses() {
        assert_eq!(AppError::CartMismatch.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Gateway(GatewayError::Api {
                status: 500,
                message: "boom".into()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::TooManyRequests("cooldown".into()).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }
}
