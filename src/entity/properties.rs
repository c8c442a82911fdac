use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub display_name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::product_properties::Entity")]
    ProductProperties,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        super::product_properties::Relation::Products.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::product_properties::Relation::Properties.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
