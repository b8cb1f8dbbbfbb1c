use axum::extract::State;
use axum::Json;

use crate::api::extract::ApiJson;
use crate::error::GatewayResult;
use crate::gateway;
use crate::models::{ChatRequest, ChatResponse, ExpandRequest, SearchResponse};
use crate::state::AppState;

/// POST /api/chat - Query expansion search:
///   1. Expand the query into keywords (model or local stopword filter)
///   2. Embeddings search on the backend (cached per keyword string)
///   3. Wrap the results in a single-page envelope
///
/// `page` and `page_size` are accepted for compatibility; the envelope always
/// describes one page holding every result.
pub async fn expand(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ExpandRequest>,
) -> GatewayResult<Json<SearchResponse>> {
    tracing::debug!(
        "Expansion search for '{}' (page {}, page_size {})",
        req.query,
        req.page,
        req.page_size
    );
    let response = gateway::expand_and_search(&state, &req.query).await?;
    tracing::info!("Expansion search returned {} projects", response.results.len());
    Ok(Json(response))
}

/// POST /api/chat/message - Conversational answer plus the top 10 projects,
/// falling back to the backend's `/chat` when the local flow fails.
pub async fn message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ChatRequest>,
) -> GatewayResult<Json<ChatResponse>> {
    let response = gateway::chat(&state, &req.query).await?;
    Ok(Json(response))
}
