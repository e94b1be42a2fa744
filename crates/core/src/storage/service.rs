//! Storage service implementation using Apache OpenDAL.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use opendal::{Operator, services};
use tracing::debug;

use super::config::{S3Credentials, StorageConfig};
use super::error::StorageError;
use super::path::StoredObjectPath;

/// Time-bounded read URL over a private object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedUrl {
    /// The presigned URL.
    pub url: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
}

/// Write capability acting with the caller's own permissions.
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Write `bytes` to `path`.
    async fn upload(
        &self,
        path: &StoredObjectPath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;
}

/// Signing capability acting with the system's permissions. Never writes.
#[async_trait]
pub trait ObjectSigner: Send + Sync {
    /// Mint a read URL for `path` valid for `ttl`.
    async fn sign(&self, path: &StoredObjectPath, ttl: Duration)
    -> Result<SignedUrl, StorageError>;
}

/// Two capability views over one bucket.
pub trait ObjectStore: Send + Sync {
    /// Build a write view bound to the caller's delegated token.
    fn user_view(&self, delegated_token: &str) -> Result<Box<dyn ObjectUploader>, StorageError>;

    /// The process-wide signing view.
    fn privileged_view(&self) -> &dyn ObjectSigner;

    /// TTL for URLs handed to the inference upstream.
    fn inference_url_ttl(&self) -> Duration;

    /// TTL for URLs returned to the caller.
    fn viewer_url_ttl(&self) -> Duration;
}

/// Storage service over an S3-compatible bucket.
///
/// The privileged operator is built once, at construction. User operators
/// are built per request from the caller's token and dropped with it.
pub struct StorageService {
    config: StorageConfig,
    privileged: PrivilegedStorage,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = create_operator(&config, &config.service, None)?;
        Ok(Self {
            config,
            privileged: PrivilegedStorage { operator },
        })
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl ObjectStore for StorageService {
    fn user_view(&self, delegated_token: &str) -> Result<Box<dyn ObjectUploader>, StorageError> {
        if delegated_token.trim().is_empty() {
            return Err(StorageError::configuration("missing delegated token"));
        }
        let operator = create_operator(&self.config, &self.config.user, Some(delegated_token))?;
        Ok(Box::new(UserStorage { operator }))
    }

    fn privileged_view(&self) -> &dyn ObjectSigner {
        &self.privileged
    }

    fn inference_url_ttl(&self) -> Duration {
        Duration::from_secs(self.config.inference_url_ttl_secs)
    }

    fn viewer_url_ttl(&self) -> Duration {
        Duration::from_secs(self.config.viewer_url_ttl_secs)
    }
}

/// Write view bound to one caller's session token.
struct UserStorage {
    operator: Operator,
}

#[async_trait]
impl ObjectUploader for UserStorage {
    async fn upload(
        &self,
        path: &StoredObjectPath,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = bytes.len();
        self.operator
            .write_with(path.as_str(), bytes)
            .content_type(content_type)
            .await
            .map_err(StorageError::from)?;

        debug!(object_path = %path, size, "Object written");
        Ok(())
    }
}

/// Signing view using the service credentials.
struct PrivilegedStorage {
    operator: Operator,
}

#[async_trait]
impl ObjectSigner for PrivilegedStorage {
    async fn sign(
        &self,
        path: &StoredObjectPath,
        ttl: Duration,
    ) -> Result<SignedUrl, StorageError> {
        let presigned = self
            .operator
            .presign_read(path.as_str(), ttl)
            .await
            .map_err(StorageError::from)?;

        Ok(SignedUrl {
            url: presigned.uri().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)),
        })
    }
}

/// Create an OpenDAL S3 operator for one credential set.
fn create_operator(
    config: &StorageConfig,
    credentials: &S3Credentials,
    session_token: Option<&str>,
) -> Result<Operator, StorageError> {
    let mut builder = services::S3::default()
        .endpoint(&config.endpoint)
        .bucket(&config.bucket)
        .region(&config.region)
        .access_key_id(&credentials.access_key_id)
        .secret_access_key(&credentials.secret_access_key)
        .disable_config_load();

    if let Some(token) = session_token {
        builder = builder.session_token(token);
    }

    Ok(Operator::new(builder)
        .map_err(|e| StorageError::configuration(e.to_string()))?
        .finish())
}
