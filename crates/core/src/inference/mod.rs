//! Inference gateway: classify an image reachable at a URL.
//!
//! Exactly two implementations exist, chosen once at startup:
//! - `HttpInferenceClient` when an upstream base URL is configured
//! - `StubInferenceClient` otherwise

mod client;
mod error;
mod stub;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use nutriscan_shared::InferenceConfig;

pub use client::{API_KEY_HEADER, HttpInferenceClient, REQUEST_ID_HEADER};
pub use error::InferenceError;
pub use stub::{StubInferenceClient, UNDETERMINED_LABEL};
pub use types::Prediction;

/// Classifies images by URL.
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Classify the image at `image_url`. One attempt, no retries.
    async fn classify(&self, image_url: &str, request_id: &str)
    -> Result<Prediction, InferenceError>;
}

/// The configured inference implementation.
#[derive(Debug, Clone)]
pub enum InferenceBackend {
    /// Remote HTTP upstream.
    Remote(HttpInferenceClient),
    /// Fixed-answer stub.
    Stub(StubInferenceClient),
}

impl InferenceBackend {
    /// Select the backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, InferenceError> {
        if config.is_stub() {
            return Ok(Self::Stub(StubInferenceClient));
        }

        let api_key = Some(config.api_key.clone()).filter(|key| !key.is_empty());
        HttpInferenceClient::new(
            config.base_url.trim(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
        .map(Self::Remote)
    }

    /// Returns true for the stub backend.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        matches!(self, Self::Stub(_))
    }
}

#[async_trait]
impl InferenceGateway for InferenceBackend {
    async fn classify(
        &self,
        image_url: &str,
        request_id: &str,
    ) -> Result<Prediction, InferenceError> {
        match self {
            Self::Remote(client) => client.classify(image_url, request_id).await,
            Self::Stub(stub) => stub.classify(image_url, request_id).await,
        }
    }
}
