//! Paging and sort specifications

use sea_orm::{Order, QueryOrder, Select};
use serde::{Deserialize, Serialize};

use crate::db::models::{PropertyColumn, PropertyEntity};
use crate::errors::{AppError, Result};

/// Sortable property columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Price,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "price" => Some(Self::Price),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    fn column(self) -> PropertyColumn {
        match self {
            Self::Id => PropertyColumn::Id,
            Self::Title => PropertyColumn::Title,
            Self::Price => PropertyColumn::Price,
            Self::CreatedAt => PropertyColumn::CreatedAt,
            Self::UpdatedAt => PropertyColumn::UpdatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Result ordering. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl Sort {
    /// Parse `field[,direction]`. Absent or unrecognised input gives the
    /// default sort; a missing direction means ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(Self::try_parse).unwrap_or_default()
    }

    fn try_parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(2, ',');
        let field = SortField::parse(parts.next()?)?;
        let direction = match parts.next().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
            Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            Some(_) => return None,
        };
        Some(Self { field, direction })
    }

    /// Order a select, with `id` as tie-breaker so pages never overlap
    pub fn apply(&self, select: Select<PropertyEntity>) -> Select<PropertyEntity> {
        let order = self.direction.order();
        let select = select.order_by(self.field.column(), order.clone());
        if self.field == SortField::Id {
            select
        } else {
            select.order_by(PropertyColumn::Id, order)
        }
    }
}

/// Zero-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
    page: u64,
    size: u64,
}

/// Wire form; every deserialized request goes through [`PageRequest::new`]
#[derive(Deserialize)]
struct RawPageRequest {
    page: u64,
    size: u64,
}

impl TryFrom<RawPageRequest> for PageRequest {
    type Error = AppError;

    fn try_from(raw: RawPageRequest) -> Result<Self> {
        Self::new(raw.page, raw.size)
    }
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Result<Self> {
        if size == 0 {
            return Err(AppError::InvalidPage {
                message: "page size must be greater than zero".to_string(),
            });
        }
        Ok(Self { page, size })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    /// Same page with the size capped at `max_size`
    pub fn clamped(self, max_size: u64) -> Self {
        Self {
            page: self.page,
            size: self.size.min(max_size.max(1)),
        }
    }
}

/// One page of results plus totals for the whole match set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_items,
            total_pages: total_items.div_ceil(request.size()),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
