//! EstateHub Common Library
//!
//! Shared code for the EstateHub back office including:
//! - Database models, attribute store and repository
//! - Dynamic property search (predicates, paging, relation fetching)
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod search;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use search::{FetchDepth, Page, PageRequest, PropertySearchService, PropertyView, SearchRequest};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
