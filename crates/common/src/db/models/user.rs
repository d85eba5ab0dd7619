//! User account, owned by the account subsystem and only read here

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text", unique)]
    pub username: String,

    #[sea_orm(column_type = "Text")]
    pub email: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::sale_info::Entity")]
    SaleInfo,
}

impl Related<super::sale_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleInfo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
