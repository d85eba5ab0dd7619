//! Attribute store over the entity-attribute-value side table
//!
//! Read-side contract used by the search engine plus the guarded write
//! path. The predicate builder's detail filters assume what the write
//! path enforces here: one value per (property, attribute) pair, and
//! numeric definitions only ever holding canonical decimal strings.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::models::{
    DefineDetail, DefineDetailColumn, DefineDetailEntity, PropertyDetail,
    PropertyDetailActiveModel, PropertyDetailColumn, PropertyDetailEntity,
};
use crate::errors::{AppError, Result};

/// Value to attach to a property for one attribute definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDetailValue {
    pub attribute_id: i32,
    pub value: String,
}

/// Render a decimal in the canonical form stored for numeric attributes
/// and used by numeric detail filters: no exponent, no trailing zeros.
pub fn canonical_number(number: &Decimal) -> String {
    number.normalize().to_string()
}

/// Check a raw value against its definition and return the string to store
pub fn normalize_value(definition: &DefineDetail, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidAttributeValue {
            attribute_id: definition.id,
            value: raw.to_string(),
            reason: "value must not be empty".to_string(),
        });
    }

    if !definition.is_number {
        return Ok(trimmed.to_string());
    }

    Decimal::from_str(trimmed)
        .map(|number| canonical_number(&number))
        .map_err(|e| AppError::InvalidAttributeValue {
            attribute_id: definition.id,
            value: raw.to_string(),
            reason: format!("{} is a numeric attribute: {}", definition.name, e),
        })
}

/// Data access for attribute definitions and values
pub struct AttributeStore<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> AttributeStore<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// All values stored for one property, ordered by attribute id
    pub async fn find_values_for_property(&self, property_id: i32) -> Result<Vec<PropertyDetail>> {
        PropertyDetailEntity::find()
            .filter(PropertyDetailColumn::PropertyId.eq(property_id))
            .order_by_asc(PropertyDetailColumn::DefineDetailId)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    /// Values for a batch of properties in one round trip
    pub async fn find_values_for_properties(
        &self,
        property_ids: &BTreeSet<i32>,
    ) -> Result<Vec<PropertyDetail>> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }

        PropertyDetailEntity::find()
            .filter(PropertyDetailColumn::PropertyId.is_in(property_ids.iter().copied()))
            .order_by_asc(PropertyDetailColumn::PropertyId)
            .order_by_asc(PropertyDetailColumn::DefineDetailId)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    pub async fn find_definitions_by_ids(&self, ids: &BTreeSet<i32>) -> Result<Vec<DefineDetail>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        DefineDetailEntity::find()
            .filter(DefineDetailColumn::Id.is_in(ids.iter().copied()))
            .order_by_asc(DefineDetailColumn::Id)
            .all(self.db)
            .await
            .map_err(Into::into)
    }

    /// Number of the given attributes that already hold a value for the property
    pub async fn count_existing(&self, property_id: i32, attribute_ids: &[i32]) -> Result<u64> {
        if attribute_ids.is_empty() {
            return Ok(0);
        }

        PropertyDetailEntity::find()
            .filter(PropertyDetailColumn::PropertyId.eq(property_id))
            .filter(PropertyDetailColumn::DefineDetailId.is_in(attribute_ids.iter().copied()))
            .count(self.db)
            .await
            .map_err(Into::into)
    }

    /// Remove every value of a property; returns the number of rows deleted
    pub async fn delete_by_property(&self, property_id: i32) -> Result<u64> {
        let result = PropertyDetailEntity::delete_many()
            .filter(PropertyDetailColumn::PropertyId.eq(property_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }

    /// Remove a single value; returns whether a row existed
    pub async fn delete_one(&self, property_id: i32, attribute_id: i32) -> Result<bool> {
        let result = PropertyDetailEntity::delete_by_id((attribute_id, property_id))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected > 0)
    }

    /// Attach values to a property.
    ///
    /// Rejects the whole batch when a definition is unknown, a numeric value
    /// does not parse, the batch names an attribute twice, or the property
    /// already holds a value for one of the attributes. Run it inside a
    /// transaction when partial writes must not survive a store failure.
    pub async fn insert_values(
        &self,
        property_id: i32,
        values: &[NewDetailValue],
    ) -> Result<Vec<PropertyDetail>> {
        let requested: BTreeSet<i32> = values.iter().map(|v| v.attribute_id).collect();
        if requested.len() != values.len() {
            return Err(AppError::Duplicate {
                message: format!("attribute listed more than once for property {}", property_id),
            });
        }

        let definitions: HashMap<i32, DefineDetail> = self
            .find_definitions_by_ids(&requested)
            .await?
            .into_iter()
            .map(|d| (d.id, d))
            .collect();

        if let Some(missing) = requested.iter().find(|id| !definitions.contains_key(*id)) {
            return Err(AppError::NotFound {
                resource_type: "attribute definition".to_string(),
                id: missing.to_string(),
            });
        }

        let attribute_ids: Vec<i32> = requested.iter().copied().collect();
        let existing = self.count_existing(property_id, &attribute_ids).await?;
        if existing > 0 {
            return Err(AppError::Duplicate {
                message: format!(
                    "property {} already has {} of the requested attributes",
                    property_id, existing
                ),
            });
        }

        let mut rows = Vec::with_capacity(values.len());
        for value in values {
            // Presence checked above
            let Some(definition) = definitions.get(&value.attribute_id) else {
                continue;
            };
            rows.push(PropertyDetailActiveModel {
                define_detail_id: Set(value.attribute_id),
                property_id: Set(property_id),
                value: Set(normalize_value(definition, &value.value)?),
            });
        }

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let model = PropertyDetailEntity::insert(row)
                .exec_with_returning(self.db)
                .await
                .map_err(|e| AppError::from_write(e, "property detail"))?;
            inserted.push(model);
        }

        debug!(property_id, count = inserted.len(), "Property details inserted");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::{self, dec, PropertySeed};

    fn definition(is_number: bool) -> DefineDetail {
        DefineDetail {
            id: 1,
            name: "Area".to_string(),
            is_number,
            unit: Some("m2".to_string()),
            is_show: true,
        }
    }

    #[test]
    fn test_canonical_number_strips_trailing_zeros() {
        assert_eq!(canonical_number(&dec("2")), "2");
        assert_eq!(canonical_number(&dec("2.50")), "2.5");
        assert_eq!(canonical_number(&dec("80.000")), "80");
        assert_eq!(canonical_number(&dec("2000000000")), "2000000000");
    }

    #[test]
    fn test_normalize_numeric_value() {
        assert_eq!(normalize_value(&definition(true), " 80.0 ").unwrap(), "80");
        let err = normalize_value(&definition(true), "eighty").unwrap_err();
        assert!(matches!(err, AppError::InvalidAttributeValue { attribute_id: 1, .. }));
    }

    #[test]
    fn test_normalize_text_value() {
        assert_eq!(normalize_value(&definition(false), " South-east ").unwrap(), "South-east");
        assert!(normalize_value(&definition(false), "   ").is_err());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_pair() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let property = fixtures::insert_property(db, PropertySeed::titled("Duplicated")).await;
        let area = fixtures::insert_definition(db, "Area", true).await;
        let store = AttributeStore::new(db);

        let first = vec![NewDetailValue { attribute_id: area.id, value: "80.0".into() }];
        let rows = store.insert_values(property.id, &first).await.unwrap();
        assert_eq!(rows[0].value, "80");

        let again = vec![NewDetailValue { attribute_id: area.id, value: "95".into() }];
        let err = store.insert_values(property.id, &again).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));

        // The original value is kept, not overwritten
        let values = store.find_values_for_property(property.id).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "80");
    }

    #[tokio::test]
    async fn test_insert_rejects_unknown_definition_and_bad_number() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let property = fixtures::insert_property(db, PropertySeed::titled("Checked")).await;
        let bedrooms = fixtures::insert_definition(db, "Bedrooms", true).await;
        let store = AttributeStore::new(db);

        let unknown = vec![NewDetailValue { attribute_id: 999, value: "1".into() }];
        assert!(matches!(
            store.insert_values(property.id, &unknown).await.unwrap_err(),
            AppError::NotFound { .. }
        ));

        let bad = vec![NewDetailValue { attribute_id: bedrooms.id, value: "two".into() }];
        assert!(matches!(
            store.insert_values(property.id, &bad).await.unwrap_err(),
            AppError::InvalidAttributeValue { .. }
        ));

        assert_eq!(store.count_existing(property.id, &[bedrooms.id]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_one_and_by_property() {
        let pool = fixtures::pool().await;
        let db = pool.write();
        let property = fixtures::insert_property(db, PropertySeed::titled("Cleanup")).await;
        let area = fixtures::insert_definition(db, "Area", true).await;
        let view = fixtures::insert_definition(db, "View", false).await;
        fixtures::set_detail(db, property.id, area.id, "80").await;
        fixtures::set_detail(db, property.id, view.id, "Sea").await;
        let store = AttributeStore::new(db);

        assert_eq!(store.count_existing(property.id, &[area.id, view.id]).await.unwrap(), 2);
        assert!(store.delete_one(property.id, area.id).await.unwrap());
        assert!(!store.delete_one(property.id, area.id).await.unwrap());
        assert_eq!(store.delete_by_property(property.id).await.unwrap(), 1);
        assert!(store.find_values_for_property(property.id).await.unwrap().is_empty());
    }
}
