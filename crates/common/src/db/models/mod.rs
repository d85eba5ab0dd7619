//! SeaORM entity models
//!
//! Database entities for EstateHub

pub mod define_detail;
pub mod file;
pub mod gallery;
pub mod property;
pub mod property_area;
pub mod property_detail;
pub mod property_type;
pub mod sale_info;
pub mod user;

pub use property::{
    Entity as PropertyEntity,
    Model as Property,
    ActiveModel as PropertyActiveModel,
    Column as PropertyColumn,
};

pub use property_type::{
    Entity as PropertyTypeEntity,
    Model as PropertyType,
    ActiveModel as PropertyTypeActiveModel,
    Column as PropertyTypeColumn,
};

pub use property_area::{
    Entity as PropertyAreaEntity,
    Model as PropertyArea,
    ActiveModel as PropertyAreaActiveModel,
    Column as PropertyAreaColumn,
};

pub use sale_info::{
    Entity as SaleInfoEntity,
    Model as SaleInfo,
    ActiveModel as SaleInfoActiveModel,
    Column as SaleInfoColumn,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};

pub use file::{
    Entity as FileEntity,
    Model as File,
    ActiveModel as FileActiveModel,
    Column as FileColumn,
};

pub use gallery::{
    Entity as GalleryEntity,
    Model as Gallery,
    ActiveModel as GalleryActiveModel,
    Column as GalleryColumn,
};

pub use define_detail::{
    Entity as DefineDetailEntity,
    Model as DefineDetail,
    ActiveModel as DefineDetailActiveModel,
    Column as DefineDetailColumn,
};

pub use property_detail::{
    Entity as PropertyDetailEntity,
    Model as PropertyDetail,
    ActiveModel as PropertyDetailActiveModel,
    Column as PropertyDetailColumn,
};
