//! Attribute definition ("define details"): declares the kind of every
//! value stored against it

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "define_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    /// Values must parse as decimals when set
    pub is_number: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub unit: Option<String>,

    /// Shown on public listing pages
    pub is_show: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::property_detail::Entity")]
    Values,
}

impl Related<super::property_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Values.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
