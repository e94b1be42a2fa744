//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication and request-ID middleware
//! - JSON error rendering

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::{Router, http::header::AUTHORIZATION, middleware::map_request};
use nutriscan_core::prediction::PredictionService;
use nutriscan_shared::IdentityVerifier;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{REQUEST_ID_HEADER, strip_blank_request_id};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Bearer token verifier.
    pub verifier: Arc<IdentityVerifier>,
    /// Upload pipeline.
    pub predictions: Arc<PredictionService>,
}

/// Creates the main application router.
///
/// Every response carries `X-Request-ID`, either the caller's or a fresh
/// UUID.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(&state))
        .layer(TraceLayer::new_for_http())
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([REQUEST_ID_HEADER]),
        )
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(map_request(strip_blank_request_id))
        .with_state(state)
}
