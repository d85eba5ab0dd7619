//! Property search and detail maintenance handlers

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use estatehub_common::{
    db::models::PropertyDetail,
    db::NewDetailValue,
    errors::{AppError, Result},
    search::{DetailView, FetchDepth, Page, PropertyView, SearchRequest},
};

/// Paging, sort and depth for a search call
#[derive(Debug, Deserialize, Validate)]
pub struct SearchParams {
    /// Zero-based page number
    #[validate(range(max = 1_000_000))]
    pub page: Option<u64>,

    /// Page size; defaults to the configured size, capped at the maximum
    pub size: Option<u64>,

    /// `field,direction`, e.g. `price,desc`
    #[validate(length(max = 64))]
    pub sort: Option<String>,

    #[serde(default)]
    pub depth: FetchDepth,
}

/// Detail values to attach to one property
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AddDetailsRequest {
    #[validate(length(min = 1, max = 200))]
    pub values: Vec<NewDetailValue>,
}

/// Search properties. An absent or `null` body matches everything.
pub async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
    body: Bytes,
) -> Result<Json<Page<PropertyView>>> {
    params.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let request = parse_search_body(&body)?;
    let page = state.search.page_request(params.page, params.size)?;

    let result = state
        .search
        .search(request.as_ref(), &page, params.sort.as_deref(), params.depth)
        .await?;

    Ok(Json(result))
}

fn parse_search_body(body: &[u8]) -> Result<Option<SearchRequest>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    serde_json::from_slice::<Option<SearchRequest>>(body).map_err(|e| AppError::Validation {
        message: format!("invalid search request: {}", e),
        field: None,
    })
}

/// Get a property with all associations
pub async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PropertyView>> {
    let property = state.search.find_by_id(id).await?;
    Ok(Json(property))
}

/// Delete a property together with its galleries and detail values
pub async fn delete_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    if !state.repo.delete_property(id).await? {
        return Err(AppError::PropertyNotFound { id });
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_property_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<DetailView>>> {
    let details = state.repo.property_details(id).await?;
    Ok(Json(details))
}

/// Attach detail values; the whole batch is rejected on any conflict
pub async fn add_property_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<AddDetailsRequest>,
) -> Result<(StatusCode, Json<Vec<PropertyDetail>>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("values".to_string()),
    })?;

    let inserted = state.repo.add_property_details(id, &request.values).await?;

    tracing::info!(
        property_id = id,
        count = inserted.len(),
        "Detail values attached"
    );

    Ok((StatusCode::CREATED, Json(inserted)))
}

pub async fn remove_property_detail(
    State(state): State<AppState>,
    Path((id, attribute_id)): Path<(i32, i32)>,
) -> Result<StatusCode> {
    if !state.repo.remove_property_detail(id, attribute_id).await? {
        return Err(AppError::NotFound {
            resource_type: "property detail".to_string(),
            id: format!("{}/{}", id, attribute_id),
        });
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_body() {
        assert_eq!(parse_search_body(b"").unwrap(), None);
        assert_eq!(parse_search_body(b"  \n").unwrap(), None);
        assert_eq!(parse_search_body(b"null").unwrap(), None);
        assert_eq!(parse_search_body(b"{}").unwrap(), Some(SearchRequest::default()));

        let err = parse_search_body(b"{\"minPrice\": \"cheap\"}").unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn test_search_params_validation() {
        let params = SearchParams {
            page: Some(0),
            size: Some(20),
            sort: Some("x".repeat(65)),
            depth: FetchDepth::Full,
        };
        assert!(params.validate().is_err());
    }
}
