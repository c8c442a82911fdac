use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{ContactMethod, CustomOrder, CustomOrderImage, CustomOrderStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCustomOrderRequest {
    pub customer_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub contact_method: ContactMethod,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    /// Reference images already uploaded to storage.
    #[serde(default)]
    pub image_urls: Vec<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCustomOrderRequest {
    pub status: Option<CustomOrderStatus>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomOrderDetail {
    #[serde(flatten)]
    pub order: CustomOrder,
    pub images: Vec<CustomOrderImage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomOrderList {
    #[schema(value_type = Vec<CustomOrder>)]
    pub items: Vec<CustomOrder>,
}
