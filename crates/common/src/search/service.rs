//! Property search service: the entry point the gateway calls

use std::time::Instant;

use sea_orm::EntityTrait;
use tracing::{info, instrument};

use crate::config::SearchConfig;
use crate::db::models::PropertyEntity;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::metrics;
use crate::search::executor::QueryExecutor;
use crate::search::fetch::{FetchDepth, FetchPlanner, PropertyView};
use crate::search::page::{Page, PageRequest, Sort};
use crate::search::predicate::build_predicate;
use crate::search::request::SearchRequest;

#[derive(Clone)]
pub struct PropertySearchService {
    pool: DbPool,
    config: SearchConfig,
}

impl PropertySearchService {
    pub fn new(pool: DbPool, config: SearchConfig) -> Self {
        Self { pool, config }
    }

    /// Page request from optional caller input, with the configured default
    /// size and upper bound applied. An explicit size of zero is rejected.
    pub fn page_request(&self, page: Option<u64>, size: Option<u64>) -> Result<PageRequest> {
        let request = PageRequest::new(
            page.unwrap_or(0),
            size.unwrap_or(self.config.default_page_size),
        )?;
        Ok(request.clamped(self.config.max_page_size))
    }

    /// Search properties. A missing request matches everything.
    #[instrument(skip(self, request, page), fields(page = page.page(), size = page.size()))]
    pub async fn search(
        &self,
        request: Option<&SearchRequest>,
        page: &PageRequest,
        sort: Option<&str>,
        depth: FetchDepth,
    ) -> Result<Page<PropertyView>> {
        let start = Instant::now();

        let page = page.clamped(self.config.max_page_size);
        let predicate = build_predicate(request, self.config.numeric_detail_comparison);
        let sort = Sort::parse(sort);

        let result = QueryExecutor::new(self.pool.read())
            .execute(&predicate, &sort, &page, depth)
            .await?;

        let elapsed = start.elapsed();
        metrics::record_search(elapsed.as_secs_f64(), depth.as_str(), result.total_items);

        info!(
            total = result.total_items,
            returned = result.items.len(),
            filtered = !predicate.is_match_all(),
            duration_ms = elapsed.as_millis() as u64,
            "Property search completed"
        );

        Ok(result)
    }

    /// Every property at summary depth
    pub async fn list_all(&self, page: &PageRequest, sort: Option<&str>) -> Result<Page<PropertyView>> {
        self.search(None, page, sort, FetchDepth::Summary).await
    }

    /// One property at full depth
    pub async fn find_by_id(&self, id: i32) -> Result<PropertyView> {
        let db = self.pool.read();
        let property = PropertyEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or(AppError::PropertyNotFound { id })?;

        FetchPlanner::new(db)
            .load(vec![property], FetchDepth::Full)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal {
                message: format!("fetch planner dropped property {}", id),
            })
    }
}
