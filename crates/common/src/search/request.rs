//! Search request: an all-optional filter bag

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Property search filters. Every field is optional; an absent, blank, or
/// empty field adds no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free-text keyword matched against the listing and its lookups
    pub q: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,

    pub type_ids: Option<Vec<i32>>,
    pub area_ids: Option<Vec<i32>>,
    pub sale_user_ids: Option<Vec<i32>>,

    pub is_public: Option<bool>,
    pub is_for_rent: Option<bool>,

    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,

    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub updated_from: Option<DateTime<Utc>>,
    pub updated_to: Option<DateTime<Utc>>,

    /// Attribute filters, all of which must hold
    pub details: Option<Vec<DetailFilter>>,
}

impl SearchRequest {
    pub fn keyword(&self) -> Option<&str> {
        non_blank(self.q.as_deref())
    }

    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(self.description.as_deref())
    }

    pub fn type_ids(&self) -> Option<&[i32]> {
        non_empty(self.type_ids.as_deref())
    }

    pub fn area_ids(&self) -> Option<&[i32]> {
        non_empty(self.area_ids.as_deref())
    }

    pub fn sale_user_ids(&self) -> Option<&[i32]> {
        non_empty(self.sale_user_ids.as_deref())
    }

    pub fn detail_filters(&self) -> &[DetailFilter] {
        self.details.as_deref().unwrap_or_default()
    }
}

/// Filter on one attribute definition. Which comparison applies is read
/// from the populated fields, see [`DetailFilter::match_mode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFilter {
    /// Attribute definition id
    pub id: i32,
    pub number: Option<Decimal>,
    pub min_number: Option<Decimal>,
    pub max_number: Option<Decimal>,
    pub text: Option<String>,
}

/// Comparison a detail filter asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailMatch<'a> {
    Exact(Decimal),
    Range {
        min: Option<Decimal>,
        max: Option<Decimal>,
    },
    Text(&'a str),
}

impl DetailFilter {
    pub fn exact(id: i32, number: Decimal) -> Self {
        Self {
            id,
            number: Some(number),
            ..Self::default()
        }
    }

    pub fn range(id: i32, min: Option<Decimal>, max: Option<Decimal>) -> Self {
        Self {
            id,
            min_number: min,
            max_number: max,
            ..Self::default()
        }
    }

    pub fn text(id: i32, text: &str) -> Self {
        Self {
            id,
            text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Resolve the comparison with a fixed priority when several fields are
    /// set: exact number, then range, then text. `None` when nothing usable
    /// is populated.
    pub fn match_mode(&self) -> Option<DetailMatch<'_>> {
        if let Some(number) = self.number {
            return Some(DetailMatch::Exact(number));
        }
        if self.min_number.is_some() || self.max_number.is_some() {
            return Some(DetailMatch::Range {
                min: self.min_number,
                max: self.max_number,
            });
        }
        non_blank(self.text.as_deref()).map(DetailMatch::Text)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn non_empty(values: Option<&[i32]>) -> Option<&[i32]> {
    values.filter(|v| !v.is_empty())
}
