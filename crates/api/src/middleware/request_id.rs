//! Request correlation IDs.
//!
//! `tower_http`'s `SetRequestIdLayer` fills in `X-Request-ID` when the
//! client sent none. A client-sent blank value would survive that layer, so
//! it is stripped first and replaced like a missing one.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderName, request::Parts},
};
use tower_http::request_id::RequestId;
use uuid::Uuid;

/// Header carrying the correlation ID, both directions.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Drop an `X-Request-ID` header that is present but blank.
pub async fn strip_blank_request_id(mut request: Request) -> Request {
    let blank = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .is_some_and(|v| !v.to_str().is_ok_and(|s| !s.trim().is_empty()));

    if blank {
        request.headers_mut().remove(&REQUEST_ID_HEADER);
    }
    request
}

/// Correlation ID of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Read the ID from request parts, minting one if no layer set it.
    fn from_parts(parts: &Parts) -> Self {
        let from_layer = parts
            .extensions
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok());
        let from_header = parts
            .headers
            .get(&REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok());

        from_layer
            .or(from_header)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map_or_else(|| Self(Uuid::new_v4().to_string()), |id| Self(id.to_string()))
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
