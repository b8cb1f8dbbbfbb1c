pub mod chat;
pub mod extract;
pub mod graph;
pub mod health;
pub mod projects;
pub mod proxy;

use axum::routing::{any, get, post};
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the HTTP router. Specific routes win over the `/api/{*path}`
/// passthrough.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/chat", post(chat::expand))
        .route("/api/chat/message", post(chat::message))
        .route("/api/graph", post(graph::graph))
        .route("/api/search", get(projects::search))
        .route("/api/project/{uuid}", get(projects::project))
        .route("/api/similar/{uuid}", get(projects::similar))
        .route("/api/types", get(projects::types))
        .route("/api/{*path}", any(proxy::forward))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
