//! Storage configuration types.

use nutriscan_shared::StorageSettings;

/// Static S3 credentials.
#[derive(Clone)]
pub struct S3Credentials {
    /// Access key ID.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl std::fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[hidden]")
            .finish()
    }
}

impl S3Credentials {
    /// Create a credential pair.
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

/// Storage service configuration.
///
/// One bucket, two credential sets: `user` credentials are only ever used
/// together with the caller's session token, `service` credentials only
/// for signing read URLs.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Region reported to the endpoint.
    pub region: String,
    /// Bucket name.
    pub bucket: String,
    /// Credentials paired with the caller's session token.
    pub user: S3Credentials,
    /// Privileged credentials for URL signing.
    pub service: S3Credentials,
    /// TTL of the URL handed to the inference upstream, in seconds.
    pub inference_url_ttl_secs: u64,
    /// TTL of the URL returned to the caller, in seconds.
    pub viewer_url_ttl_secs: u64,
}

impl StorageConfig {
    /// Default inference URL TTL: 2 minutes.
    pub const DEFAULT_INFERENCE_TTL: u64 = 120;
    /// Default viewer URL TTL: 24 hours.
    pub const DEFAULT_VIEWER_TTL: u64 = 86_400;
    /// Default region for S3-compatible providers that ignore it.
    pub const DEFAULT_REGION: &'static str = "us-east-1";

    /// Create a new storage config with default TTLs.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        user: S3Credentials,
        service: S3Credentials,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: Self::DEFAULT_REGION.to_string(),
            bucket: bucket.into(),
            user,
            service,
            inference_url_ttl_secs: Self::DEFAULT_INFERENCE_TTL,
            viewer_url_ttl_secs: Self::DEFAULT_VIEWER_TTL,
        }
    }

    /// Set region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Set inference URL TTL.
    #[must_use]
    pub fn with_inference_url_ttl(mut self, secs: u64) -> Self {
        self.inference_url_ttl_secs = secs;
        self
    }

    /// Set viewer URL TTL.
    #[must_use]
    pub fn with_viewer_url_ttl(mut self, secs: u64) -> Self {
        self.viewer_url_ttl_secs = secs;
        self
    }
}

impl From<&StorageSettings> for StorageConfig {
    fn from(settings: &StorageSettings) -> Self {
        Self::new(
            settings.endpoint.clone(),
            settings.bucket.clone(),
            S3Credentials::new(
                settings.user_access_key_id.clone(),
                settings.user_secret_access_key.clone(),
            ),
            S3Credentials::new(
                settings.service_access_key_id.clone(),
                settings.service_secret_access_key.clone(),
            ),
        )
        .with_region(settings.region.clone())
        .with_inference_url_ttl(settings.inference_url_ttl_secs)
        .with_viewer_url_ttl(settings.viewer_url_ttl_secs)
    }
}
