pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod content;
pub mod custom_orders;
pub mod newsletter;
pub mod products;
