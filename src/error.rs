use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Error type for HTTP handlers.
///
/// Integration code returns `anyhow::Result`; handlers convert at the boundary
/// so every failure reaches the client as a JSON body.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request itself is invalid.
    #[error("{0}")]
    BadRequest(String),

    /// The server is missing required configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The backend or a provider answered with an error.
    #[error("Upstream error: {0:#}")]
    Upstream(anyhow::Error),

    /// Anything else.
    #[error("Internal error: {0:#}")]
    Internal(anyhow::Error),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Config(_) | GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            GatewayError::BadRequest(msg) => ("BAD_REQUEST", msg.clone()),
            GatewayError::Config(msg) => {
                tracing::error!(error = %msg, "Gateway misconfigured");
                ("CONFIG_ERROR", "Server configuration error".to_string())
            }
            GatewayError::Upstream(err) => {
                tracing::warn!(error = %format!("{err:#}"), "Upstream request failed");
                ("UPSTREAM_ERROR", format!("{err:#}"))
            }
            GatewayError::Internal(err) => {
                tracing::error!(error = %format!("{err:#}"), "Internal error");
                ("INTERNAL_ERROR", format!("{err:#}"))
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
