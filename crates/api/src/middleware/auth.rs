//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use nutriscan_shared::{AppError, AuthError, Identity};
use tracing::warn;

use super::request_id::CorrelationId;
use crate::{AppState, error::ApiError};

/// Authentication middleware that verifies bearer tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Verifies it and derives the caller `Identity`
/// 3. Stores the identity in request extensions for handlers to access
///
/// Nothing downstream runs for a rejected request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    CorrelationId(request_id): CorrelationId,
    mut request: Request,
    next: Next,
) -> Response {
    let verified = match request.headers().typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => state.verifier.verify(bearer.token()),
        None => Err(AuthError::MissingToken),
    };

    match verified {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Rejected bearer token");
            ApiError::new(e, request_id).into_response()
        }
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(AuthUser(identity): AuthUser) -> impl IntoResponse {
///     let user_id = identity.subject();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl AuthUser {
    /// Returns the caller's subject.
    #[must_use]
    pub fn user_id(&self) -> &str {
        self.0.subject()
    }

    /// Returns the inner identity.
    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into())
    }
}
