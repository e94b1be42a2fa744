//! Prediction pipeline error types.

use std::fmt;

use nutriscan_shared::{AppError, AuthError, Upstream};
use thiserror::Error;

use crate::inference::InferenceError;
use crate::storage::StorageError;

const MIB: u64 = 1024 * 1024;

/// Upload rejected before any side effect.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Declared content type is not on the allow-list.
    #[error("content type '{content_type}' is not allowed")]
    UnsupportedMediaType {
        /// The declared content type, normalized.
        content_type: String,
        /// The allow-list in effect.
        allowed: Vec<String>,
    },

    /// No file part in the request.
    #[error("no file was uploaded")]
    MissingFile,

    /// Body is empty.
    #[error("upload is empty")]
    Empty,

    /// Body exceeds the size bound.
    #[error("upload exceeds maximum of {max_bytes} bytes")]
    TooLarge {
        /// The configured bound.
        max_bytes: u64,
    },

    /// Body stream failed mid-read.
    #[error("upload could not be read: {0}")]
    Unreadable(String),
}

/// Persistence failure reported by a `PredictionRepository`.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The caller's row-level policies rejected the write.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Any other database failure.
    #[error("database error: {0}")]
    Database(String),
}

impl RepositoryError {
    /// Create a database error.
    #[must_use]
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

/// Which signed URL a signing step was minting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlPurpose {
    /// Short-lived URL for the inference upstream.
    Inference,
    /// Long-lived URL returned to the caller.
    Viewer,
}

impl fmt::Display for UrlPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inference => f.write_str("inference"),
            Self::Viewer => f.write_str("viewer"),
        }
    }
}

/// Terminal failure of one pipeline run, tagged by the step that failed.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Caller is not authenticated or cannot act downstream.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Upload failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Writing the object failed.
    #[error("storage write failed: {0}")]
    Store(#[source] StorageError),

    /// Minting a signed URL failed.
    #[error("signing {purpose} URL failed: {source}")]
    Sign {
        /// URL being minted.
        purpose: UrlPurpose,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Inference failed.
    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),

    /// Persisting the record failed.
    #[error("persisting prediction failed: {0}")]
    Persist(#[source] RepositoryError),
}

impl PredictionError {
    /// Name of the pipeline step that failed, for logs.
    #[must_use]
    pub const fn step(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "authorize",
            Self::Validation(_) => "validate",
            Self::Store(_) => "store",
            Self::Sign {
                purpose: UrlPurpose::Inference,
                ..
            } => "sign_inference_url",
            Self::Inference(_) => "infer",
            Self::Sign {
                purpose: UrlPurpose::Viewer,
                ..
            } => "sign_viewer_url",
            Self::Persist(_) => "persist",
        }
    }

    /// True when the failure is the caller's, not an upstream's.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized(_)
                | Self::Validation(_)
                | Self::Inference(InferenceError::BadInput { .. })
        )
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::Unauthorized(e) => e.into(),
            PredictionError::Validation(e) => match e {
                ValidationError::UnsupportedMediaType { allowed, .. } => Self::UnsupportedMediaType(
                    format!("Only {} allowed", format_media_types(&allowed)),
                ),
                ValidationError::MissingFile => Self::BadRequest("Missing file upload".to_string()),
                ValidationError::Empty => {
                    Self::BadRequest("Empty uploads are not allowed".to_string())
                }
                ValidationError::TooLarge { max_bytes } => {
                    Self::PayloadTooLarge(format!("Max size {}", format_size(max_bytes)))
                }
                ValidationError::Unreadable(_) => {
                    Self::BadRequest("Unable to read upload".to_string())
                }
            },
            PredictionError::Store(_) => Self::upstream(Upstream::Storage, "Unable to store image"),
            PredictionError::Sign { .. } => {
                Self::upstream(Upstream::Storage, "Unable to generate signed URL")
            }
            PredictionError::Inference(e) => match e {
                InferenceError::BadInput { .. } => {
                    Self::BadRequest("Model rejected the provided image".to_string())
                }
                InferenceError::Timeout => {
                    Self::UpstreamTimeout("Inference service timeout".to_string())
                }
                InferenceError::Gateway(_) => {
                    Self::upstream(Upstream::Inference, "Inference service unavailable")
                }
            },
            PredictionError::Persist(_) => {
                Self::upstream(Upstream::Persistence, "Unable to save prediction")
            }
        }
    }
}

/// `["image/jpeg", "image/png"]` reads as `JPEG/PNG`.
fn format_media_types(types: &[String]) -> String {
    types
        .iter()
        .map(|t| t.rsplit('/').next().unwrap_or(t).to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join("/")
}

fn format_size(bytes: u64) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
