//! Dynamic property search
//!
//! - `request`: the all-optional filter bag and detail filters
//! - `predicate`: request to condition plus to-one joins
//! - `page`: sort and paging specifications, page results
//! - `executor`: separate count and data queries
//! - `fetch`: batched association loading at summary or full depth
//! - `service`: the search entry point

mod executor;
mod fetch;
mod page;
mod predicate;
mod request;
mod service;

pub use executor::{count_query, data_query, QueryExecutor};
pub use fetch::{DetailView, FetchDepth, FetchPlanner, GalleryFile, PropertyView, SaleView};
pub use page::{Page, PageRequest, Sort, SortDirection, SortField};
pub use predicate::{build_predicate, JoinKind, Lookup, NumericComparison, PropertyPredicate};
pub use request::{DetailFilter, DetailMatch, SearchRequest};
pub use service::PropertySearchService;
