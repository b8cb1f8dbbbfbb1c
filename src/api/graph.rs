use axum::extract::State;
use axum::Json;

use crate::api::extract::ApiJson;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{GraphBody, GraphData, GraphRequest};
use crate::state::AppState;

/// Similarity threshold used when the client does not send one.
pub const DEFAULT_THRESHOLD: f64 = 0.82;

/// POST /api/graph - Similarity graph for the current search and filters.
pub async fn graph(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GraphRequest>,
) -> GatewayResult<Json<GraphData>> {
    let threshold = resolve_threshold(req.threshold)?;
    let body = GraphBody::from(&req);

    let data = state
        .backend
        .graph(&body, threshold)
        .await
        .map_err(GatewayError::Upstream)?;
    tracing::debug!(
        "Graph at threshold {threshold}: {} nodes, {} links",
        data.nodes.len(),
        data.links.len()
    );
    Ok(Json(data))
}

fn resolve_threshold(threshold: Option<f64>) -> GatewayResult<f64> {
    let threshold = threshold.unwrap_or(DEFAULT_THRESHOLD);
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(GatewayError::BadRequest(format!(
            "threshold must be between 0 and 1, got {threshold}"
        )));
    }
    Ok(threshold)
}
