//! Paginated query executor
//!
//! Runs the count against the bare predicate, then the sorted and paged data
//! query, then hands the selected rows to the fetch planner. Collections are
//! never joined into either query, so `LIMIT`/`OFFSET` and the total always
//! see one row per property.

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QuerySelect, Select};
use tracing::debug;

use crate::db::models::{Property, PropertyEntity};
use crate::errors::Result;
use crate::metrics::{QueryKind, QueryTimer};
use crate::search::fetch::{FetchDepth, FetchPlanner, PropertyView};
use crate::search::page::{Page, PageRequest, Sort};
use crate::search::predicate::PropertyPredicate;

/// Count select: predicate only, no ordering or paging
pub fn count_query(predicate: &PropertyPredicate) -> Select<PropertyEntity> {
    predicate.apply(PropertyEntity::find())
}

/// Data select: predicate, sort, then offset and limit
pub fn data_query(predicate: &PropertyPredicate, sort: &Sort, page: &PageRequest) -> Select<PropertyEntity> {
    sort.apply(predicate.apply(PropertyEntity::find()))
        .offset(page.offset())
        .limit(page.limit())
}

pub struct QueryExecutor<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> QueryExecutor<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    pub async fn count(&self, predicate: &PropertyPredicate) -> Result<u64> {
        let timer = QueryTimer::start(QueryKind::Count);
        let total = count_query(predicate).count(self.db).await?;
        timer.finish();
        Ok(total)
    }

    pub async fn fetch_page(
        &self,
        predicate: &PropertyPredicate,
        sort: &Sort,
        page: &PageRequest,
    ) -> Result<Vec<Property>> {
        let timer = QueryTimer::start(QueryKind::Data);
        let rows = data_query(predicate, sort, page).all(self.db).await?;
        timer.finish();
        Ok(rows)
    }

    /// Count, page, then load associations at `depth`
    pub async fn execute(
        &self,
        predicate: &PropertyPredicate,
        sort: &Sort,
        page: &PageRequest,
        depth: FetchDepth,
    ) -> Result<Page<PropertyView>> {
        let total = self.count(predicate).await?;

        let rows = if page.offset() >= total {
            Vec::new()
        } else {
            self.fetch_page(predicate, sort, page).await?
        };

        debug!(
            total,
            offset = page.offset(),
            limit = page.limit(),
            fetched = rows.len(),
            "Page selected"
        );

        let items = FetchPlanner::new(self.db).load(rows, depth).await?;
        Ok(Page::new(items, page, total))
    }
}
