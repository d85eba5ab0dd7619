//! Property entity: the listing record every search targets

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "properties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "Decimal(Some((19, 2)))")]
    pub price: Decimal,

    pub is_public: bool,

    pub is_for_rent: bool,

    pub type_id: Option<i32>,

    pub area_id: Option<i32>,

    /// Sale user owning the listing (key of `sale_infos`)
    pub sale_user_id: Option<i32>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::property_type::Entity",
        from = "Column::TypeId",
        to = "super::property_type::Column::Id"
    )]
    PropertyType,

    #[sea_orm(
        belongs_to = "super::property_area::Entity",
        from = "Column::AreaId",
        to = "super::property_area::Column::Id"
    )]
    PropertyArea,

    #[sea_orm(
        belongs_to = "super::sale_info::Entity",
        from = "Column::SaleUserId",
        to = "super::sale_info::Column::UserId"
    )]
    SaleInfo,

    #[sea_orm(has_many = "super::gallery::Entity")]
    Galleries,

    #[sea_orm(has_many = "super::property_detail::Entity")]
    Details,
}

impl Related<super::property_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyType.def()
    }
}

impl Related<super::property_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PropertyArea.def()
    }
}

impl Related<super::sale_info::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SaleInfo.def()
    }
}

impl Related<super::gallery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Galleries.def()
    }
}

impl Related<super::property_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
