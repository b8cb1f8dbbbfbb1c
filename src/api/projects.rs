use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::extract::ApiQuery;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{Project, SearchBody, SearchParams, SearchResponse, TypesResponse};
use crate::pagination::{page_links, PageLink};
use crate::state::AppState;

/// Search results plus the pagination bar for them.
#[derive(Debug, Serialize)]
pub struct SearchPage {
    #[serde(flatten)]
    pub response: SearchResponse,
    pub links: Vec<PageLink>,
}

/// GET /api/search - Keyword search with facet filters, forwarded to the backend.
pub async fn search(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> GatewayResult<Json<SearchPage>> {
    let body = SearchBody::from(&params);
    let response = state
        .backend
        .search(&body)
        .await
        .map_err(GatewayError::Upstream)?;

    let links = page_links(response.pagination.page, response.pagination.total_pages);
    Ok(Json(SearchPage { response, links }))
}

/// GET /api/project/{uuid}
pub async fn project(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> GatewayResult<Json<Project>> {
    let uuid = require_uuid(&uuid)?;
    let project = state
        .backend
        .project(uuid)
        .await
        .map_err(GatewayError::Upstream)?;
    Ok(Json(project))
}

/// GET /api/similar/{uuid}
pub async fn similar(
    State(state): State<AppState>,
    Path(uuid): Path<String>,
) -> GatewayResult<Json<Vec<Project>>> {
    let uuid = require_uuid(&uuid)?;
    let projects = state
        .backend
        .similar(uuid)
        .await
        .map_err(GatewayError::Upstream)?;
    Ok(Json(projects))
}

/// GET /api/types - Facet values for the search filters.
pub async fn types(State(state): State<AppState>) -> GatewayResult<Json<TypesResponse>> {
    let types = state
        .backend
        .types()
        .await
        .map_err(GatewayError::Upstream)?;
    Ok(Json(types))
}

fn require_uuid(uuid: &str) -> GatewayResult<&str> {
    let uuid = uuid.trim();
    if uuid.is_empty() {
        return Err(GatewayError::BadRequest("Project id is required".to_string()));
    }
    Ok(uuid)
}
