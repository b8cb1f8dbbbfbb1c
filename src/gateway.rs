//! The query expansion and chat flows shared by the HTTP handlers.

use anyhow::Context;

use crate::error::{GatewayError, GatewayResult};
use crate::llm::keywords::local_keywords;
use crate::llm::query_expand::expand_query;
use crate::llm::summary::summarize;
use crate::models::{ChatResponse, Pagination, Project, SearchResponse};
use crate::state::AppState;

/// Most projects a chat reply talks about.
pub const CHAT_PROJECT_LIMIT: usize = 10;

fn require_query(query: &str) -> GatewayResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(GatewayError::BadRequest("Query is required".to_string()));
    }
    Ok(query)
}

/// Expand `query` into keywords, run the embeddings search and wrap the
/// results in a single-page envelope.
pub async fn expand_and_search(state: &AppState, query: &str) -> GatewayResult<SearchResponse> {
    let query = require_query(query)?;
    if state.broker_key_missing() {
        return Err(GatewayError::Config("PRIVATE_KEY is missing".to_string()));
    }

    let keywords = expand_query(
        &state.http_client,
        &state.config.llm,
        &state.broker,
        query,
    )
    .await;

    let results = lookup_projects(state, &keywords)
        .await
        .map_err(GatewayError::Upstream)?;

    Ok(SearchResponse {
        pagination: Pagination::single_page(results.len()),
        results,
    })
}

/// Embeddings search for an expanded keyword string, served from the cache
/// when the same keywords were looked up recently.
pub async fn lookup_projects(state: &AppState, keywords: &str) -> anyhow::Result<Vec<Project>> {
    if let Some(cached) = state.cache.get(keywords) {
        tracing::debug!("Embeddings cache hit for '{keywords}'");
        return Ok(cached);
    }

    let projects = state
        .backend
        .embeddings(keywords)
        .await
        .context("Embeddings lookup failed")?;
    state.cache.insert(keywords, projects.clone());
    Ok(projects)
}

/// Answer a chat query with a summary of the best matching projects.
/// Falls back to the backend's own `/chat` when any step fails.
pub async fn chat(state: &AppState, query: &str) -> GatewayResult<ChatResponse> {
    let query = require_query(query)?;

    match answer_with_projects(state, query).await {
        Ok(response) => Ok(response),
        Err(primary) => {
            tracing::warn!("Chat flow failed: {primary:#}, falling back to backend /chat");
            state.backend.chat(query).await.map_err(|fallback| {
                GatewayError::Upstream(anyhow::anyhow!(
                    "chat flow failed: {primary:#}, fallback also failed: {fallback:#}"
                ))
            })
        }
    }
}

async fn answer_with_projects(state: &AppState, query: &str) -> anyhow::Result<ChatResponse> {
    if state.broker_key_missing() {
        anyhow::bail!("PRIVATE_KEY is missing");
    }

    let keywords = local_keywords(query);
    let mut projects = lookup_projects(state, &keywords).await?;
    projects.truncate(CHAT_PROJECT_LIMIT);

    let message = summarize(
        &state.http_client,
        &state.config.llm,
        &state.broker,
        query,
        &projects,
    )
    .await
    .context("Failed to summarize projects")?;

    Ok(ChatResponse { message, projects })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn offline_state() -> AppState {
        let config = Config {
            api_url: "http://127.0.0.1:9".into(),
            ..Default::default()
        };
        AppState::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let state = offline_state();
        let err = expand_and_search(&state, "   ").await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(_)));
        let err = chat(&state, "").await.unwrap_err();
        assert!(matches!(err, GatewayError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_missing_wallet_key_is_config_error() {
        let mut config = Config::default();
        config.llm.provider = "broker".into();
        let state = AppState::new(config).unwrap();
        let err = expand_and_search(&state, "defi").await.unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[tokio::test]
    async fn test_cached_results_skip_backend() {
        let state = offline_state();
        let cached = vec![Project {
            uuid: "p1".into(),
            ..Default::default()
        }];
        state.cache.insert("defi, lending", cached.clone());

        let response = expand_and_search(&state, "DeFi lending").await.unwrap();
        assert_eq!(response.results, cached);
        assert_eq!(response.pagination.total, 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_upstream_error() {
        let state = offline_state();
        let err = expand_and_search(&state, "bridges").await.unwrap_err();
        assert!(matches!(err, GatewayError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_chat_reports_both_failures() {
        let state = offline_state();
        let err = chat(&state, "bridges").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("chat flow failed"));
        assert!(msg.contains("fallback also failed"));
    }
}
