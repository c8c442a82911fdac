use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Property};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePropertyRequest {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<Category>)]
    pub items: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PropertyList {
    #[schema(value_type = Vec<Property>)]
    pub items: Vec<Property>,
}
