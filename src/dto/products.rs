use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, ProductImage, Property};

fn one() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub dimensions: String,
    #[schema(value_type = String, example = "150.00")]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    #[serde(default = "one")]
    pub quantity: i32,
    #[serde(default)]
    pub property_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub dimensions: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub quantity: Option<i32>,
    /// Replaces the product's property set when present.
    pub property_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddProductImageRequest {
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<Category>,
    pub images: Vec<ProductImage>,
    pub properties: Vec<Property>,
}

/// Signed stock change; the result may not drop below zero.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InventoryAdjustRequest {
    pub delta: i32,
}
