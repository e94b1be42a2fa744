//! Prediction pipeline types.

use serde::Serialize;

use crate::inference::Prediction;

/// An inbound upload as declared by the client.
///
/// `body` is consumed lazily so oversized payloads are rejected without
/// buffering them.
#[derive(Debug)]
pub struct UploadSubmission<S> {
    /// Declared filename.
    pub filename: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Body chunks.
    pub body: S,
}

/// Row written once per successful inference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRecord {
    /// Subject of the caller.
    pub user_id: String,
    /// Storage key of the classified image.
    pub image_path: String,
    /// Full prediction as returned by the model.
    pub result: Prediction,
    /// Confidence, duplicated for querying.
    pub confidence: f64,
}

/// Successful pipeline outcome returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResponse {
    /// Model output.
    pub prediction: Prediction,
    /// Long-lived signed URL for viewing the image.
    pub image_url: String,
    /// Request identifier used throughout the run.
    pub request_id: String,
}
