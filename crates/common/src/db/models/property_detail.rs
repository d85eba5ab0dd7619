//! Attribute value ("property details"), one row per (attribute, property)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "property_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub define_detail_id: i32,

    #[sea_orm(primary_key, auto_increment = false)]
    pub property_id: i32,

    /// Canonical decimal string for numeric definitions, free text otherwise
    #[sea_orm(column_type = "Text")]
    pub value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::define_detail::Entity",
        from = "Column::DefineDetailId",
        to = "super::define_detail::Column::Id"
    )]
    Definition,

    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id",
        on_delete = "Cascade"
    )]
    Property,
}

impl Related<super::define_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Definition.def()
    }
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
