//! Application-wide error types.
//!
//! `AppError` is the only error shape callers ever observe. Collaborator
//! failures are classified into one of these variants before they leave
//! the request pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Upstream collaborator a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    /// Object storage (writes and URL signing).
    Storage,
    /// Inference service.
    Inference,
    /// Relational store holding prediction records.
    Persistence,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Storage => "storage",
            Self::Inference => "inference",
            Self::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Request rejected as malformed, or the model rejected its payload.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Declared content type is not on the allow-list.
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Upload exceeds the configured size bound.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// An upstream collaborator failed.
    #[error("Upstream {upstream} failure: {message}")]
    UpstreamFailure {
        /// Which collaborator failed.
        upstream: Upstream,
        /// Caller-facing message.
        message: String,
    },

    /// The inference upstream did not answer within its deadline.
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Creates an upstream failure error.
    #[must_use]
    pub fn upstream(upstream: Upstream, message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            upstream,
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::BadRequest(_) => 400,
            Self::UnsupportedMediaType(_) => 415,
            Self::PayloadTooLarge(_) => 413,
            Self::UpstreamFailure { .. } => 502,
            Self::UpstreamTimeout(_) => 504,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            Self::UnsupportedMediaType(_) => "unsupported_media_type",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::UpstreamFailure {
                upstream: Upstream::Storage,
                ..
            } => "storage_unavailable",
            Self::UpstreamFailure {
                upstream: Upstream::Inference,
                ..
            } => "inference_unavailable",
            Self::UpstreamFailure {
                upstream: Upstream::Persistence,
                ..
            } => "persistence_unavailable",
            Self::UpstreamTimeout(_) => "upstream_timeout",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Returns the caller-facing message without the category prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::UnsupportedMediaType(msg)
            | Self::PayloadTooLarge(msg)
            | Self::UpstreamTimeout(msg)
            | Self::Internal(msg)
            | Self::UpstreamFailure { message: msg, .. } => msg,
        }
    }
}
