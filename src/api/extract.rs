//! Request extractors whose rejections go through [`GatewayError`], so a
//! malformed body or query string gets the same JSON error body as every
//! other failure.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::GatewayError;

/// JSON request body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub struct ApiJson<T>(pub T);

/// Query string.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(GatewayError))]
pub struct ApiQuery<T>(pub T);
