//! HTTP client for the remote inference service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::InferenceGateway;
use super::error::InferenceError;
use super::types::{InferRequest, InferResponse, Prediction};

const USER_AGENT: &str = concat!("nutriscan/", env!("CARGO_PKG_VERSION"));

/// Header carrying the optional shared secret.
pub const API_KEY_HEADER: &str = "X-API-Key";
/// Header carrying the request identifier.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Inference client backed by `POST {base_url}/infer`.
///
/// One attempt per call. The configured timeout bounds the whole exchange,
/// including reading the response body.
#[derive(Clone)]
pub struct HttpInferenceClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for HttpInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInferenceClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[hidden]"))
            .finish_non_exhaustive()
    }
}

impl HttpInferenceClient {
    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InferenceError::Gateway` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::gateway(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/infer", base_url.trim_end_matches('/')),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// The full URL calls are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl InferenceGateway for HttpInferenceClient {
    async fn classify(
        &self,
        image_url: &str,
        request_id: &str,
    ) -> Result<Prediction, InferenceError> {
        let request_id = Some(request_id).filter(|id| !id.is_empty());

        let mut request = self.http_client.post(&self.endpoint).json(&InferRequest {
            image_url,
            request_id,
        });
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }
        if let Some(id) = request_id {
            request = request.header(REQUEST_ID_HEADER, id);
        }

        debug!(endpoint = %self.endpoint, request_id, "Calling inference service");

        let response = request.send().await.map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(InferenceError::from_status(status.as_u16()));
        }

        let body: InferResponse = response.json().await.map_err(classify_transport_error)?;
        Ok(body.into_prediction())
    }
}

fn classify_transport_error(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else if err.is_decode() {
        InferenceError::gateway(format!("malformed inference response: {err}"))
    } else {
        InferenceError::gateway(format!("inference network failure: {err}"))
    }
}
