//! Repository pattern for database operations
//!
//! Write paths owned by the back office that the search engine depends on:
//! lookup creation, property rows, gallery links, and the guarded attribute
//! value writes. Reads for search live in `crate::search`.

use crate::db::attributes::{AttributeStore, NewDetailValue};
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::search::DetailView;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Input for a new listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_public: bool,
    pub is_for_rent: bool,
    pub type_id: Option<i32>,
    pub area_id: Option<i32>,
    pub sale_user_id: Option<i32>,
}

/// Input for a new attribute definition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDefinition {
    pub name: String,
    pub is_number: bool,
    pub unit: Option<String>,
    pub is_show: bool,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Lookup Operations
    // ========================================================================

    pub async fn create_property_type(&self, name: &str) -> Result<PropertyType> {
        PropertyTypeActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await
        .map_err(|e| AppError::from_write(e, "property type"))
    }

    pub async fn create_property_area(&self, name: &str, link: &str) -> Result<PropertyArea> {
        PropertyAreaActiveModel {
            name: Set(name.to_string()),
            link: Set(link.to_string()),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await
        .map_err(|e| AppError::from_write(e, "property area"))
    }

    pub async fn create_definition(&self, definition: NewDefinition) -> Result<DefineDetail> {
        DefineDetailActiveModel {
            name: Set(definition.name),
            is_number: Set(definition.is_number),
            unit: Set(definition.unit),
            is_show: Set(definition.is_show),
            ..Default::default()
        }
        .insert(self.write_conn())
        .await
        .map_err(|e| AppError::from_write(e, "attribute definition"))
    }

    // ========================================================================
    // Property Operations
    // ========================================================================

    /// Create a new property
    pub async fn create_property(&self, property: NewProperty) -> Result<Property> {
        let now = chrono::Utc::now();

        let model = PropertyActiveModel {
            title: Set(property.title),
            description: Set(property.description),
            price: Set(property.price),
            is_public: Set(property.is_public),
            is_for_rent: Set(property.is_for_rent),
            type_id: Set(property.type_id),
            area_id: Set(property.area_id),
            sale_user_id: Set(property.sale_user_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        };

        model.insert(self.write_conn()).await.map_err(Into::into)
    }

    /// Find property by ID, without associations
    pub async fn find_property_by_id(&self, id: i32) -> Result<Option<Property>> {
        PropertyEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Delete a property together with its detail values and gallery links
    pub async fn delete_property(&self, id: i32) -> Result<bool> {
        let txn = self.write_conn().begin().await?;

        let details = AttributeStore::new(&txn).delete_by_property(id).await?;
        let gallery = GalleryEntity::delete_many()
            .filter(GalleryColumn::PropertyId.eq(id))
            .exec(&txn)
            .await?;
        let result = PropertyEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        tracing::info!(
            property_id = id,
            details_removed = details,
            gallery_removed = gallery.rows_affected,
            deleted = result.rows_affected > 0,
            "Property delete finished"
        );

        Ok(result.rows_affected > 0)
    }

    /// Link an uploaded file into a property's gallery
    pub async fn add_gallery_entry(&self, property_id: i32, file_id: i32) -> Result<Gallery> {
        require_property(self.write_conn(), property_id).await?;

        GalleryEntity::insert(GalleryActiveModel {
            property_id: Set(property_id),
            file_id: Set(file_id),
        })
        .exec_with_returning(self.write_conn())
        .await
        .map_err(|e| AppError::from_write(e, "gallery entry"))
    }

    // ========================================================================
    // Detail Value Operations
    // ========================================================================

    /// Detail values of a property joined with their definitions
    pub async fn property_details(&self, property_id: i32) -> Result<Vec<DetailView>> {
        require_property(self.read_conn(), property_id).await?;

        let store = AttributeStore::new(self.read_conn());
        let values = store.find_values_for_property(property_id).await?;
        let ids: BTreeSet<i32> = values.iter().map(|v| v.define_detail_id).collect();
        let definitions: HashMap<i32, DefineDetail> = store
            .find_definitions_by_ids(&ids)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        Ok(values
            .into_iter()
            .filter_map(|v| {
                let definition = definitions.get(&v.define_detail_id)?.clone();
                Some(DetailView::new(definition, v.value))
            })
            .collect())
    }

    /// Attach detail values, all or nothing
    pub async fn add_property_details(
        &self,
        property_id: i32,
        values: &[NewDetailValue],
    ) -> Result<Vec<PropertyDetail>> {
        let txn = self.write_conn().begin().await?;
        require_property(&txn, property_id).await?;
        let inserted = AttributeStore::new(&txn).insert_values(property_id, values).await?;
        txn.commit().await?;

        tracing::info!(property_id, count = inserted.len(), "Property details added");
        Ok(inserted)
    }

    /// Remove one detail value; returns whether it existed
    pub async fn remove_property_detail(&self, property_id: i32, attribute_id: i32) -> Result<bool> {
        AttributeStore::new(self.write_conn())
            .delete_one(property_id, attribute_id)
            .await
    }
}

/// The property row as seen by `db`; writes check against the primary
async fn require_property<C: ConnectionTrait>(db: &C, id: i32) -> Result<Property> {
    PropertyEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(AppError::PropertyNotFound { id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, dec, PropertySeed};
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_create_property_and_lookups() {
        let pool = fixtures::pool().await;
        let repo = Repository::new(pool.clone());

        let kind = repo.create_property_type("Apartment").await.unwrap();
        let area = repo.create_property_area("District 1", "district-1").await.unwrap();
        let property = repo
            .create_property(NewProperty {
                title: "Riverside".into(),
                description: "Two bedrooms".into(),
                price: dec("1500000000"),
                is_public: true,
                is_for_rent: false,
                type_id: Some(kind.id),
                area_id: Some(area.id),
                sale_user_id: None,
            })
            .await
            .unwrap();

        let found = repo.find_property_by_id(property.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Riverside");
        assert_eq!(found.type_id, Some(kind.id));

        let err = repo.create_property_type("Apartment").await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_writes_check_the_primary_not_a_lagging_replica() {
        let primary = fixtures::pool().await;
        let lagging = fixtures::pool().await;
        let repo = Repository::new(DbPool {
            primary: primary.primary.clone(),
            replica: Some(lagging.primary.clone()),
        });

        let property = fixtures::insert_property(primary.write(), PropertySeed::titled("Fresh")).await;
        let rooms = fixtures::insert_definition(primary.write(), "Rooms", true).await;
        let photo = fixtures::insert_file(primary.write(), "hall.jpg").await;
        assert!(repo.find_property_by_id(property.id).await.unwrap().is_none());

        let inserted = repo
            .add_property_details(
                property.id,
                &[NewDetailValue { attribute_id: rooms.id, value: "4".into() }],
            )
            .await
            .unwrap();
        assert_eq!(inserted.len(), 1);
        repo.add_gallery_entry(property.id, photo.id).await.unwrap();

        let err = repo
            .add_property_details(9999, &[NewDetailValue { attribute_id: rooms.id, value: "1".into() }])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PropertyNotFound { id: 9999 }));
    }

    #[tokio::test]
    async fn test_delete_property_cascades() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let repo = Repository::new(pool.clone());
        let property = fixtures::insert_property(db, PropertySeed::titled("Doomed")).await;
        let area = fixtures::insert_definition(db, "Area", true).await;
        let photo = fixtures::insert_file(db, "front.jpg").await;
        fixtures::set_detail(db, property.id, area.id, "80").await;
        repo.add_gallery_entry(property.id, photo.id).await.unwrap();

        assert!(repo.delete_property(property.id).await.unwrap());
        assert!(!repo.delete_property(property.id).await.unwrap());

        assert_eq!(PropertyDetailEntity::find().count(db).await.unwrap(), 0);
        assert_eq!(GalleryEntity::find().count(db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_property_details_roundtrip() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let repo = Repository::new(pool.clone());
        let property = fixtures::insert_property(db, PropertySeed::titled("Detailed")).await;
        let bedrooms = repo
            .create_definition(NewDefinition {
                name: "Bedrooms".into(),
                is_number: true,
                unit: None,
                is_show: true,
            })
            .await
            .unwrap();

        repo.add_property_details(
            property.id,
            &[NewDetailValue { attribute_id: bedrooms.id, value: "3.0".into() }],
        )
        .await
        .unwrap();

        let details = repo.property_details(property.id).await.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].name, "Bedrooms");
        assert_eq!(details[0].value, "3");

        assert!(repo.remove_property_detail(property.id, bedrooms.id).await.unwrap());
        assert!(repo.property_details(property.id).await.unwrap().is_empty());

        let err = repo.property_details(4242).await.unwrap_err();
        assert!(matches!(err, AppError::PropertyNotFound { id: 4242 }));
    }
}
