use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DeriveActiveEnum, EnumIter, sea_query::StringLen};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity;

#[derive(Debug, Serialize, Deserialize, ToSchema, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub dimensions: String,
    #[schema(value_type = String, example = "150.00")]
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    /// Units in stock.
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub session_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum CustomOrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "declined")]
    Declined,
}

impl CustomOrderStatus {
    /// Workflow: pending → accepted → in_progress → completed, with
    /// `declined` reachable from any open state.
    pub fn can_transition_to(self, next: CustomOrderStatus) -> bool {
        use CustomOrderStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted)
                | (Accepted, InProgress)
                | (InProgress, Completed)
                | (Pending | Accepted | InProgress, Declined)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CustomOrderStatus::Completed | CustomOrderStatus::Declined)
    }

    pub fn label(self) -> &'static str {
        match self {
            CustomOrderStatus::Pending => "Pending",
            CustomOrderStatus::Accepted => "Accepted",
            CustomOrderStatus::InProgress => "In Progress",
            CustomOrderStatus::Completed => "Completed",
            CustomOrderStatus::Declined => "Declined",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ContactMethod {
    #[sea_orm(string_value = "instagram")]
    Instagram,
    #[sea_orm(string_value = "phone")]
    Phone,
    #[default]
    #[sea_orm(string_value = "email")]
    Email,
}

impl ContactMethod {
    pub fn label(self) -> &'static str {
        match self {
            ContactMethod::Instagram => "Instagram",
            ContactMethod::Phone => "Phone",
            ContactMethod::Email => "Email",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrder {
    pub id: Uuid,
    pub reference_id: String,
    pub customer_name: String,
    pub description: Option<String>,
    pub contact_method: ContactMethod,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub status: CustomOrderStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomOrderImage {
    pub id: Uuid,
    pub custom_order_id: Uuid,
    pub image_url: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub is_subscribed: bool,
    pub subscribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortfolioImage {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum BlogTag {
    #[default]
    #[sea_orm(string_value = "personal")]
    Personal,
    #[sea_orm(string_value = "rug_making")]
    RugMaking,
    #[sea_orm(string_value = "inspiration")]
    Inspiration,
    #[sea_orm(string_value = "events")]
    Events,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BlogPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub links: Option<String>,
    pub tag: BlogTag,
    pub created_at: DateTime<Utc>,
}

impl From<entity::categories::Model> for Category {
    fn from(model: entity::categories::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            name: model.name,
        }
    }
}

impl From<entity::properties::Model> for Property {
    fn from(model: entity::properties::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            display_name: model.display_name,
        }
    }
}

impl From<entity::products::Model> for Product {
    fn from(model: entity::products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            dimensions: model.dimensions,
            price: model.price,
            category_id: model.category_id,
            quantity: model.quantity,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::product_images::Model> for ProductImage {
    fn from(model: entity::product_images::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            image_url: model.image_url,
            thumbnail_url: model.thumbnail_url,
            is_primary: model.is_primary,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::custom_orders::Model> for CustomOrder {
    fn from(model: entity::custom_orders::Model) -> Self {
        Self {
            id: model.id,
            reference_id: model.reference_id,
            customer_name: model.customer_name,
            description: model.description,
            contact_method: model.contact_method,
            contact_info: model.contact_info,
            email: model.email,
            status: model.status,
            admin_notes: model.admin_notes,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::custom_order_images::Model> for CustomOrderImage {
    fn from(model: entity::custom_order_images::Model) -> Self {
        Self {
            id: model.id,
            custom_order_id: model.custom_order_id,
            image_url: model.image_url,
            uploaded_at: model.uploaded_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::newsletter_subscribers::Model> for NewsletterSubscriber {
    fn from(model: entity::newsletter_subscribers::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            is_subscribed: model.is_subscribed,
            subscribed_at: model.subscribed_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::faqs::Model> for Faq {
    fn from(model: entity::faqs::Model) -> Self {
        Self {
            id: model.id,
            question: model.question,
            answer: model.answer,
        }
    }
}

impl From<entity::portfolio_images::Model> for PortfolioImage {
    fn from(model: entity::portfolio_images::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            image_url: model.image_url,
            thumbnail_url: model.thumbnail_url,
            is_visible: model.is_visible,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<entity::blog_posts::Model> for BlogPost {
    fn from(model: entity::blog_posts::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            links: model.links,
            tag: model.tag,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
