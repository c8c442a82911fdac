use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_order_images")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub custom_order_id: Uuid,
    pub image_url: String,
    pub uploaded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::custom_orders::Entity",
        from = "Column::CustomOrderId",
        to = "super::custom_orders::Column::Id",
        on_delete = "Cascade"
    )]
    CustomOrders,
}

impl Related<super::custom_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
