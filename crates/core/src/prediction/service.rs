//! Upload orchestrator.
//!
//! One run per request, strictly sequential:
//!
//! ```text
//! validate -> store -> sign (short) -> infer -> sign (long) -> persist -> respond
//! ```
//!
//! Every step returns early on failure. Nothing is rolled back: an object
//! stored before a later failure stays in the bucket with no record.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use nutriscan_shared::Identity;
use tracing::{error, info, warn};

use super::error::{PredictionError, RepositoryError, UrlPurpose};
use super::types::{PredictionRecord, PredictionResponse, UploadSubmission};
use super::validation::{BodyError, UploadPolicy};
use crate::inference::InferenceGateway;
use crate::storage::{ObjectStore, StoredObjectPath};

/// Repository trait for prediction persistence.
///
/// Implementations write with the caller's own permissions.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    /// Insert one prediction record on behalf of `identity`.
    async fn insert(
        &self,
        identity: &Identity,
        record: &PredictionRecord,
    ) -> Result<(), RepositoryError>;
}

/// Prediction service driving the upload pipeline.
#[derive(Clone)]
pub struct PredictionService {
    storage: Arc<dyn ObjectStore>,
    inference: Arc<dyn InferenceGateway>,
    repo: Arc<dyn PredictionRepository>,
    policy: UploadPolicy,
}

impl PredictionService {
    /// Create a new prediction service.
    #[must_use]
    pub fn new(
        storage: Arc<dyn ObjectStore>,
        inference: Arc<dyn InferenceGateway>,
        repo: Arc<dyn PredictionRepository>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            storage,
            inference,
            repo,
            policy,
        }
    }

    /// Upload constraints in effect.
    #[must_use]
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Run the pipeline for one upload.
    ///
    /// Either the full response is produced or exactly one classified
    /// error is returned. Failures are logged here with the request ID and
    /// subject.
    ///
    /// # Errors
    ///
    /// Returns the `PredictionError` of the first step that failed.
    pub async fn submit<S, E>(
        &self,
        identity: &Identity,
        upload: UploadSubmission<S>,
        request_id: &str,
    ) -> Result<PredictionResponse, PredictionError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: BodyError,
    {
        let result = self.run(identity, upload, request_id).await;

        match &result {
            Ok(response) => info!(
                request_id,
                user_id = identity.subject(),
                label = %response.prediction.label,
                confidence = response.prediction.confidence,
                "Prediction created"
            ),
            Err(e) if e.is_client_error() => warn!(
                request_id,
                user_id = identity.subject(),
                step = e.step(),
                error = %e,
                "Prediction request rejected"
            ),
            Err(e) => error!(
                request_id,
                user_id = identity.subject(),
                step = e.step(),
                error = %e,
                "Prediction pipeline failed"
            ),
        }

        result
    }

    async fn run<S, E>(
        &self,
        identity: &Identity,
        upload: UploadSubmission<S>,
        request_id: &str,
    ) -> Result<PredictionResponse, PredictionError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: BodyError,
    {
        // Validate
        let content_type = self
            .policy
            .check_content_type(upload.content_type.as_deref())?;
        let bytes = self.policy.read_bounded(upload.body).await?;

        // Store
        let path = StoredObjectPath::generate(identity.subject(), upload.filename.as_deref());
        let user_view = self
            .storage
            .user_view(identity.delegated_token())
            .map_err(PredictionError::Store)?;
        user_view
            .upload(&path, bytes, &content_type)
            .await
            .map_err(PredictionError::Store)?;
        info!(request_id, object_path = %path, "Image stored");

        // Sign for inference
        let signer = self.storage.privileged_view();
        let inference_url = signer
            .sign(&path, self.storage.inference_url_ttl())
            .await
            .map_err(|source| PredictionError::Sign {
                purpose: UrlPurpose::Inference,
                source,
            })?;

        // Infer
        let prediction = self
            .inference
            .classify(&inference_url.url, request_id)
            .await?;

        // Sign for the caller
        let viewer_url = signer
            .sign(&path, self.storage.viewer_url_ttl())
            .await
            .map_err(|source| PredictionError::Sign {
                purpose: UrlPurpose::Viewer,
                source,
            })?;

        // Persist
        let record = PredictionRecord {
            user_id: identity.subject().to_string(),
            image_path: path.to_string(),
            confidence: prediction.confidence,
            result: prediction.clone(),
        };
        self.repo
            .insert(identity, &record)
            .await
            .map_err(PredictionError::Persist)?;

        Ok(PredictionResponse {
            prediction,
            image_url: viewer_url.url,
            request_id: request_id.to_string(),
        })
    }
}
