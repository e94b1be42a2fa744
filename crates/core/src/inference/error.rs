//! Inference error types.

use thiserror::Error;

/// Failure of a single inference call.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Upstream rejected the payload (400, 404, 409, 422).
    #[error("inference rejected payload ({status})")]
    BadInput {
        /// HTTP status returned by the upstream.
        status: u16,
    },

    /// Call did not complete within the configured deadline.
    #[error("inference service timeout")]
    Timeout,

    /// Any other upstream failure.
    #[error("inference gateway error: {0}")]
    Gateway(String),
}

impl InferenceError {
    /// Create a gateway error.
    #[must_use]
    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::Gateway(msg.into())
    }

    /// Classify a non-2xx upstream status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 404 | 409 | 422 => Self::BadInput { status },
            _ => Self::Gateway(format!("inference upstream error ({status})")),
        }
    }
}
