//! HTTP rendering of `AppError`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutriscan_shared::AppError;
use serde::Serialize;

/// JSON error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable snake-case error code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Correlation ID of the failed request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// An `AppError` bound to the request it failed.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    request_id: Option<String>,
}

impl ApiError {
    /// Wrap `error` for the request identified by `request_id`.
    #[must_use]
    pub fn new(error: impl Into<AppError>, request_id: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            request_id: Some(request_id.into()),
        }
    }

    /// The wrapped error.
    #[must_use]
    pub const fn error(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self {
            error,
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = ErrorBody {
            error: self.error.error_code(),
            message: self.error.message().to_string(),
            request_id: self.request_id,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriscan_shared::Upstream;

    #[test]
    fn test_status_follows_error() {
        let response = ApiError::new(AppError::PayloadTooLarge("Max size 5 MB".into()), "r-1")
            .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let response =
            ApiError::from(AppError::upstream(Upstream::Inference, "down")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_body_shape() {
        let body = ErrorBody {
            error: "upstream_timeout",
            message: "Inference service timeout".to_string(),
            request_id: Some("r-1".to_string()),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "upstream_timeout");
        assert_eq!(json["request_id"], "r-1");

        let body = ErrorBody {
            request_id: None,
            ..body
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("request_id").is_none());
    }
}
