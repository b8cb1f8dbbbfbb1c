use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::Response;

use crate::error::{GatewayError, GatewayResult};
use crate::state::AppState;

/// Largest request body forwarded to the backend.
const MAX_FORWARD_BODY_BYTES: usize = 2 * 1024 * 1024;

/// ANY /api/{*path} - Pass any other API call straight to the backend.
pub async fn forward(
    State(state): State<AppState>,
    Path(path): Path<String>,
    req: Request,
) -> GatewayResult<Response> {
    let (parts, body) = req.into_parts();
    let body = axum::body::to_bytes(body, MAX_FORWARD_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::BadRequest(format!("Failed to read request body: {e}")))?;

    let mut headers = HeaderMap::new();
    for name in [CONTENT_TYPE, ACCEPT] {
        if let Some(value) = parts.headers.get(&name) {
            headers.insert(name, value.clone());
        }
    }

    tracing::debug!("Forwarding {} /{path}", parts.method);
    let upstream = state
        .backend
        .forward(parts.method, &path, parts.uri.query(), headers, body.to_vec())
        .await
        .map_err(GatewayError::Upstream)?;

    let mut builder = Response::builder().status(upstream.status());
    if let Some(content_type) = upstream.headers().get(CONTENT_TYPE) {
        builder = builder.header(CONTENT_TYPE, content_type.clone());
    }

    builder
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| GatewayError::Internal(e.into()))
}
