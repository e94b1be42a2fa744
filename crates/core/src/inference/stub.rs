//! Stub inference used when no upstream is configured.

use async_trait::async_trait;

use super::InferenceGateway;
use super::error::InferenceError;
use super::types::Prediction;

/// Label returned by the stub.
pub const UNDETERMINED_LABEL: &str = "undetermined";

/// Always answers `undetermined` with zero confidence. Local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubInferenceClient;

#[async_trait]
impl InferenceGateway for StubInferenceClient {
    async fn classify(
        &self,
        _image_url: &str,
        _request_id: &str,
    ) -> Result<Prediction, InferenceError> {
        Ok(Prediction::new(UNDETERMINED_LABEL, 0.0))
    }
}
