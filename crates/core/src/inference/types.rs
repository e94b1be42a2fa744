//! Inference wire types.

use serde::{Deserialize, Serialize};

/// Classification returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class label.
    pub label: String,
    /// Model confidence, expected in `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    /// Create a prediction.
    #[must_use]
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Request body for `POST {base_url}/infer`.
#[derive(Debug, Serialize)]
pub(crate) struct InferRequest<'a> {
    pub image_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<&'a str>,
}

/// Response body; the upstream may nest the prediction or return it inline.
// TODO: drop the flat shape once the inference service confirms it only emits `prediction`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum InferResponse {
    Nested { prediction: Prediction },
    Flat(Prediction),
}

impl InferResponse {
    pub(crate) fn into_prediction(self) -> Prediction {
        match self {
            Self::Nested { prediction } | Self::Flat(prediction) => prediction,
        }
    }
}
