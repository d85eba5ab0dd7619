//! Relation fetch planner
//!
//! Attaches associations to an already-selected page of properties. Each
//! association is loaded with one `IN (...)` query keyed by the ids found on
//! the page, so the number of queries depends on the depth, never on the
//! number of rows, and no join ever multiplies parent rows.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::models::*;
use crate::db::AttributeStore;
use crate::errors::Result;
use crate::metrics::{QueryKind, QueryTimer};

/// How much of the object graph to load per property
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchDepth {
    /// Type, area and sale info only, for list views
    #[default]
    Summary,
    /// Adds the sale user, gallery files and detail values
    Full,
}

impl FetchDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchDepth::Summary => "summary",
            FetchDepth::Full => "full",
        }
    }
}

/// Property with its associations. Collections are `None` at summary depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub is_public: bool,
    pub is_for_rent: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub property_type: Option<PropertyType>,
    pub area: Option<PropertyArea>,
    pub sale: Option<SaleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub galleries: Option<Vec<GalleryFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<DetailView>>,
}

impl PropertyView {
    fn bare(property: Property) -> Self {
        Self {
            id: property.id,
            title: property.title,
            description: property.description,
            price: property.price,
            is_public: property.is_public,
            is_for_rent: property.is_for_rent,
            created_at: property.created_at,
            updated_at: property.updated_at,
            property_type: None,
            area: None,
            sale: None,
            galleries: None,
            details: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleView {
    pub user_id: i32,
    pub full_name: String,
    pub phone: String,
    /// Linked account, loaded at full depth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryFile {
    pub file_id: i32,
    pub name: String,
    pub url: String,
    pub content_type: String,
}

impl From<File> for GalleryFile {
    fn from(file: File) -> Self {
        Self {
            file_id: file.id,
            name: file.name,
            url: file.url,
            content_type: file.content_type,
        }
    }
}

/// Attribute value joined with its definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub attribute_id: i32,
    pub name: String,
    pub is_number: bool,
    pub unit: Option<String>,
    pub is_show: bool,
    pub value: String,
}

impl DetailView {
    pub fn new(definition: DefineDetail, value: String) -> Self {
        Self {
            attribute_id: definition.id,
            name: definition.name,
            is_number: definition.is_number,
            unit: definition.unit,
            is_show: definition.is_show,
            value,
        }
    }
}

/// Batched association loader
pub struct FetchPlanner<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> FetchPlanner<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Build views for `properties`, keeping their order
    pub async fn load(&self, properties: Vec<Property>, depth: FetchDepth) -> Result<Vec<PropertyView>> {
        if properties.is_empty() {
            return Ok(Vec::new());
        }

        let property_ids: BTreeSet<i32> = properties.iter().map(|p| p.id).collect();
        let type_ids: BTreeSet<i32> = properties.iter().filter_map(|p| p.type_id).collect();
        let area_ids: BTreeSet<i32> = properties.iter().filter_map(|p| p.area_id).collect();
        let sale_ids: BTreeSet<i32> = properties.iter().filter_map(|p| p.sale_user_id).collect();

        let types = index_by(
            self.by_ids::<PropertyTypeEntity>(PropertyTypeColumn::Id, &type_ids)
                .await?,
            |t| t.id,
        );
        let areas = index_by(
            self.by_ids::<PropertyAreaEntity>(PropertyAreaColumn::Id, &area_ids)
                .await?,
            |a| a.id,
        );
        let sales = index_by(
            self.by_ids::<SaleInfoEntity>(SaleInfoColumn::UserId, &sale_ids)
                .await?,
            |s| s.user_id,
        );

        let collections = match depth {
            FetchDepth::Summary => None,
            FetchDepth::Full => Some(self.load_collections(&property_ids, &sale_ids).await?),
        };

        debug!(
            properties = property_ids.len(),
            types = types.len(),
            areas = areas.len(),
            sales = sales.len(),
            depth = depth.as_str(),
            "Associations loaded"
        );

        let views = properties
            .into_iter()
            .map(|property| {
                let id = property.id;
                let type_id = property.type_id;
                let area_id = property.area_id;
                let sale_id = property.sale_user_id;

                let mut view = PropertyView::bare(property);
                view.property_type = type_id.and_then(|k| types.get(&k).cloned());
                view.area = area_id.and_then(|k| areas.get(&k).cloned());
                view.sale = sale_id.and_then(|k| sales.get(&k)).map(|sale| SaleView {
                    user_id: sale.user_id,
                    full_name: sale.full_name.clone(),
                    phone: sale.phone.clone(),
                    user: collections
                        .as_ref()
                        .and_then(|c| c.users.get(&sale.user_id).cloned()),
                });

                if let Some(collections) = &collections {
                    view.galleries = Some(collections.galleries.get(&id).cloned().unwrap_or_default());
                    view.details = Some(collections.details.get(&id).cloned().unwrap_or_default());
                }
                view
            })
            .collect();

        Ok(views)
    }

    async fn load_collections(
        &self,
        property_ids: &BTreeSet<i32>,
        sale_ids: &BTreeSet<i32>,
    ) -> Result<Collections> {
        let users = index_by(
            self.by_ids::<UserEntity>(UserColumn::Id, sale_ids).await?,
            |u| u.id,
        );

        let timer = QueryTimer::start(QueryKind::Fetch);
        let links = GalleryEntity::find()
            .filter(GalleryColumn::PropertyId.is_in(property_ids.iter().copied()))
            .order_by_asc(GalleryColumn::PropertyId)
            .order_by_asc(GalleryColumn::FileId)
            .all(self.db)
            .await?;
        timer.finish();

        let file_ids: BTreeSet<i32> = links.iter().map(|g| g.file_id).collect();
        let files = index_by(
            self.by_ids::<FileEntity>(FileColumn::Id, &file_ids).await?,
            |f| f.id,
        );

        let mut galleries: HashMap<i32, Vec<GalleryFile>> = HashMap::new();
        for link in links {
            if let Some(file) = files.get(&link.file_id) {
                galleries
                    .entry(link.property_id)
                    .or_default()
                    .push(GalleryFile::from(file.clone()));
            }
        }

        let store = AttributeStore::new(self.db);
        let timer = QueryTimer::start(QueryKind::Fetch);
        let values = store.find_values_for_properties(property_ids).await?;
        timer.finish();

        let definition_ids: BTreeSet<i32> = values.iter().map(|v| v.define_detail_id).collect();
        let timer = QueryTimer::start(QueryKind::Fetch);
        let definitions = index_by(store.find_definitions_by_ids(&definition_ids).await?, |d| d.id);
        timer.finish();

        let mut details: HashMap<i32, Vec<DetailView>> = HashMap::new();
        for value in values {
            if let Some(definition) = definitions.get(&value.define_detail_id) {
                details
                    .entry(value.property_id)
                    .or_default()
                    .push(DetailView::new(definition.clone(), value.value));
            }
        }

        debug!(
            galleries = file_ids.len(),
            details = definition_ids.len(),
            "Collections loaded"
        );

        Ok(Collections { users, galleries, details })
    }

    /// Rows of `E` whose `column` is in `ids`; no query for an empty set
    async fn by_ids<E: EntityTrait>(
        &self,
        column: E::Column,
        ids: &BTreeSet<i32>,
    ) -> Result<Vec<E::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let timer = QueryTimer::start(QueryKind::Fetch);
        let rows = E::find()
            .filter(column.is_in(ids.iter().copied()))
            .all(self.db)
            .await?;
        timer.finish();
        Ok(rows)
    }
}

struct Collections {
    users: HashMap<i32, User>,
    galleries: HashMap<i32, Vec<GalleryFile>>,
    details: HashMap<i32, Vec<DetailView>>,
}

fn index_by<T, F: Fn(&T) -> i32>(rows: Vec<T>, key: F) -> HashMap<i32, T> {
    rows.into_iter().map(|row| (key(&row), row)).collect()
}
