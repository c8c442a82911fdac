use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod custom_orders;
pub mod doc;
pub mod health;
pub mod newsletter;
pub mod params;
pub mod products;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart::router())
        .nest("/checkout", checkout::router())
        .nest("/custom-orders", custom_orders::router())
        .nest("/newsletter", newsletter::router())
        .nest("/products", products::router())
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .merge(catalog::router())
        .merge(content::router())
}
