//! Schema bootstrap from the entity definitions
//!
//! Creates missing tables and the lookup indexes the relation fetch planner
//! relies on. Safe to run repeatedly; it never alters existing tables.

use sea_orm::sea_query::{ColumnDef, ForeignKey, Index, IndexCreateStatement, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, Schema};
use tracing::info;

use crate::db::models::{
    define_detail, file, gallery, property, property_area, property_detail, property_type,
    sale_info, user,
};
use crate::errors::Result;

/// Create every table used by the property search engine
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<()> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Referenced tables first so foreign keys resolve on strict backends
    create_table(db, &schema, user::Entity).await?;
    create_table(db, &schema, sale_info::Entity).await?;
    create_table(db, &schema, property_type::Entity).await?;
    create_table(db, &schema, property_area::Entity).await?;
    create_table(db, &schema, file::Entity).await?;
    create_table(db, &schema, define_detail::Entity).await?;
    if backend == DbBackend::Sqlite {
        // SQLite's decimal type caps precision at 16 digits
        db.execute(backend.build(&sqlite_property_table())).await?;
    } else {
        create_table(db, &schema, property::Entity).await?;
    }
    create_table(db, &schema, gallery::Entity).await?;
    create_table(db, &schema, property_detail::Entity).await?;

    for index in lookup_indexes() {
        db.execute(backend.build(&index)).await?;
    }

    info!("Schema ready");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

/// `properties` with a price precision SQLite accepts; otherwise the same
/// columns and keys as the entity
fn sqlite_property_table() -> TableCreateStatement {
    use property::Column;

    Table::create()
        .table(property::Entity)
        .if_not_exists()
        .col(ColumnDef::new(Column::Id).integer().not_null().auto_increment().primary_key())
        .col(ColumnDef::new(Column::Title).text().not_null())
        .col(ColumnDef::new(Column::Description).text().not_null())
        .col(ColumnDef::new(Column::Price).decimal_len(16, 2).not_null())
        .col(ColumnDef::new(Column::IsPublic).boolean().not_null())
        .col(ColumnDef::new(Column::IsForRent).boolean().not_null())
        .col(ColumnDef::new(Column::TypeId).integer().null())
        .col(ColumnDef::new(Column::AreaId).integer().null())
        .col(ColumnDef::new(Column::SaleUserId).integer().null())
        .col(ColumnDef::new(Column::CreatedAt).timestamp_with_time_zone().not_null())
        .col(ColumnDef::new(Column::UpdatedAt).timestamp_with_time_zone().not_null())
        .foreign_key(
            ForeignKey::create()
                .from(property::Entity, Column::TypeId)
                .to(property_type::Entity, property_type::Column::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .from(property::Entity, Column::AreaId)
                .to(property_area::Entity, property_area::Column::Id),
        )
        .foreign_key(
            ForeignKey::create()
                .from(property::Entity, Column::SaleUserId)
                .to(sale_info::Entity, sale_info::Column::UserId),
        )
        .to_owned()
}

/// Child-side lookups keyed by property id; the composite primary keys
/// only cover lookups that start from the other column
fn lookup_indexes() -> Vec<IndexCreateStatement> {
    vec![
        Index::create()
            .if_not_exists()
            .name("idx_property_details_property_id")
            .table(property_detail::Entity)
            .col(property_detail::Column::PropertyId)
            .to_owned(),
        Index::create()
            .if_not_exists()
            .name("idx_properties_created_at")
            .table(property::Entity)
            .col(property::Column::CreatedAt)
            .to_owned(),
    ]
}
