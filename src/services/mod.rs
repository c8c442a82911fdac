pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod content_service;
pub mod custom_order_service;
pub mod newsletter_service;
pub mod product_service;
pub mod settlement_service;

use sea_orm::{DbErr, SqlErr};

use crate::error::AppError;

/// Map a unique-constraint violation to a 409 with `message`.
pub fn conflict_on_unique(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_string()),
        _ => err.into(),
    }
}

/// Syntactic address check shared by custom orders and the newsletter.
pub fn is_valid_email(raw: &str) -> bool {
    raw.parse::<lettre::Address>().is_ok()
}
