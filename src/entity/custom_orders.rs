use sea_orm::entity::prelude::*;

use crate::models::{ContactMethod, CustomOrderStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub reference_id: String,
    pub customer_name: String,
    pub description: Option<String>,
    pub contact_method: ContactMethod,
    pub contact_info: Option<String>,
    pub email: Option<String>,
    pub status: CustomOrderStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::custom_order_images::Entity")]
    CustomOrderImages,
}

impl Related<super::custom_order_images::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomOrderImages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
