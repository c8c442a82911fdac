use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

/// Decrement a product's line by `quantity`, deleting it when it reaches zero.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    pub product_id: Uuid,
    #[serde(default = "one")]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub dimensions: String,
    #[schema(value_type = String, example = "150.00")]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[schema(value_type = String, example = "300.00")]
    pub subtotal: Decimal,
    /// Units currently in stock.
    pub available: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub id: Uuid,
    pub items: Vec<CartItemView>,
    #[schema(value_type = String, example = "300.00")]
    pub total: Decimal,
    pub item_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RemovedFromCart {
    pub product_id: Uuid,
    /// Remaining line quantity; zero when the line was deleted.
    pub remaining: i32,
}
