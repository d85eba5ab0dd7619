//! Test fixtures: in-memory SQLite store and seed helpers

use std::str::FromStr;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::config::DatabaseConfig;
use crate::db::models::*;
use crate::db::schema::create_schema;
use crate::db::DbPool;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

/// Midnight UTC on the given day of January 2024
pub fn day(n: u32) -> DateTimeWithTimeZone {
    Utc.with_ymd_and_hms(2024, 1, n, 0, 0, 0).unwrap().into()
}

/// Fresh single-connection in-memory database with the full schema
pub async fn pool() -> DbPool {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let pool = DbPool::new(&config).await.unwrap();
    create_schema(pool.write()).await.unwrap();
    pool
}

#[derive(Debug, Clone)]
pub struct PropertySeed {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_public: bool,
    pub is_for_rent: bool,
    pub type_id: Option<i32>,
    pub area_id: Option<i32>,
    pub sale_user_id: Option<i32>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl PropertySeed {
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            price: dec("1000000000"),
            is_public: true,
            is_for_rent: false,
            type_id: None,
            area_id: None,
            sale_user_id: None,
            created_at: day(1),
            updated_at: day(1),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn price(mut self, price: &str) -> Self {
        self.price = dec(price);
        self
    }

    pub fn for_rent(mut self, is_for_rent: bool) -> Self {
        self.is_for_rent = is_for_rent;
        self
    }

    pub fn public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    pub fn kind(mut self, type_id: i32) -> Self {
        self.type_id = Some(type_id);
        self
    }

    pub fn area(mut self, area_id: i32) -> Self {
        self.area_id = Some(area_id);
        self
    }

    pub fn sale(mut self, user_id: i32) -> Self {
        self.sale_user_id = Some(user_id);
        self
    }

    pub fn created(mut self, at: DateTimeWithTimeZone) -> Self {
        self.created_at = at;
        self
    }

    pub fn updated(mut self, at: DateTimeWithTimeZone) -> Self {
        self.updated_at = at;
        self
    }
}

pub async fn insert_property(db: &DatabaseConnection, seed: PropertySeed) -> Property {
    PropertyActiveModel {
        title: Set(seed.title),
        description: Set(seed.description),
        price: Set(seed.price),
        is_public: Set(seed.is_public),
        is_for_rent: Set(seed.is_for_rent),
        type_id: Set(seed.type_id),
        area_id: Set(seed.area_id),
        sale_user_id: Set(seed.sale_user_id),
        created_at: Set(seed.created_at),
        updated_at: Set(seed.updated_at),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_type(db: &DatabaseConnection, name: &str) -> PropertyType {
    PropertyTypeActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_area(db: &DatabaseConnection, name: &str, link: &str) -> PropertyArea {
    PropertyAreaActiveModel {
        name: Set(name.to_string()),
        link: Set(link.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Creates the user account and its sale info; returns the sale info
pub async fn insert_sale(db: &DatabaseConnection, username: &str, full_name: &str, phone: &str) -> SaleInfo {
    let user = UserActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@estatehub.test", username)),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    SaleInfoEntity::insert(SaleInfoActiveModel {
        user_id: Set(user.id),
        full_name: Set(full_name.to_string()),
        phone: Set(phone.to_string()),
    })
    .exec_with_returning(db)
    .await
    .unwrap()
}

pub async fn insert_file(db: &DatabaseConnection, name: &str) -> File {
    FileActiveModel {
        name: Set(name.to_string()),
        url: Set(format!("https://cdn.estatehub.test/{}", name)),
        content_type: Set("image/jpeg".to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn insert_gallery(db: &DatabaseConnection, property_id: i32, file_id: i32) {
    GalleryEntity::insert(GalleryActiveModel {
        property_id: Set(property_id),
        file_id: Set(file_id),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}

pub async fn insert_definition(db: &DatabaseConnection, name: &str, is_number: bool) -> DefineDetail {
    DefineDetailActiveModel {
        name: Set(name.to_string()),
        is_number: Set(is_number),
        unit: Set(None),
        is_show: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Raw value insert, bypassing the normalization of the guarded write path
pub async fn set_detail(db: &DatabaseConnection, property_id: i32, define_detail_id: i32, value: &str) {
    PropertyDetailEntity::insert(PropertyDetailActiveModel {
        define_detail_id: Set(define_detail_id),
        property_id: Set(property_id),
        value: Set(value.to_string()),
    })
    .exec_without_returning(db)
    .await
    .unwrap();
}
