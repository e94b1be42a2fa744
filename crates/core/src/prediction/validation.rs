//! Upload constraints: content-type allow-list and bounded body reads.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use nutriscan_shared::UploadConfig;

use super::error::ValidationError;

/// Error yielded by an upload body stream.
pub trait BodyError: std::fmt::Display {
    /// Whether the transport cut the body off at its own size limit.
    fn exceeded_limit(&self) -> bool {
        false
    }
}

impl BodyError for std::convert::Infallible {}
impl BodyError for &str {}
impl BodyError for String {}

/// Limits applied to every upload before any side effect.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_bytes: u64,
    allowed_content_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_bytes: Self::DEFAULT_MAX_BYTES,
            allowed_content_types: Self::default_content_types(),
        }
    }
}

impl UploadPolicy {
    /// Default max upload size: 5 MiB.
    pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

    /// Default allowed content types.
    #[must_use]
    pub fn default_content_types() -> Vec<String> {
        vec!["image/jpeg".to_string(), "image/png".to_string()]
    }

    /// Set maximum upload size.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Set allowed content types.
    #[must_use]
    pub fn with_allowed_content_types(mut self, types: Vec<String>) -> Self {
        self.allowed_content_types = types.iter().map(|t| normalize_content_type(t)).collect();
        self
    }

    /// Maximum upload size in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Allowed content types, normalized.
    #[must_use]
    pub fn allowed_content_types(&self) -> &[String] {
        &self.allowed_content_types
    }

    /// Check a declared content type against the allow-list.
    ///
    /// Returns the normalized type on success.
    pub fn check_content_type(&self, declared: Option<&str>) -> Result<String, ValidationError> {
        let content_type = declared.map(normalize_content_type).unwrap_or_default();

        if self.allowed_content_types.iter().any(|t| *t == content_type) {
            Ok(content_type)
        } else {
            Err(ValidationError::UnsupportedMediaType {
                content_type,
                allowed: self.allowed_content_types.clone(),
            })
        }
    }

    /// Read `body` into memory, stopping as soon as it exceeds the bound.
    ///
    /// At most `max_bytes + 1` bytes are retained. A stream error that
    /// reports an exceeded transport limit is also `TooLarge`.
    pub async fn read_bounded<S, E>(&self, body: S) -> Result<Bytes, ValidationError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: BodyError,
    {
        let limit = usize::try_from(self.max_bytes).unwrap_or(usize::MAX);
        let mut buffer = BytesMut::new();
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                if e.exceeded_limit() {
                    ValidationError::TooLarge {
                        max_bytes: self.max_bytes,
                    }
                } else {
                    ValidationError::Unreadable(e.to_string())
                }
            })?;
            let room = limit.saturating_add(1).saturating_sub(buffer.len());
            buffer.extend_from_slice(&chunk[..chunk.len().min(room)]);

            if buffer.len() > limit {
                return Err(ValidationError::TooLarge {
                    max_bytes: self.max_bytes,
                });
            }
        }

        if buffer.is_empty() {
            return Err(ValidationError::Empty);
        }
        Ok(buffer.freeze())
    }
}

impl From<&UploadConfig> for UploadPolicy {
    fn from(config: &UploadConfig) -> Self {
        Self::default()
            .with_max_bytes(config.max_bytes)
            .with_allowed_content_types(config.allowed_content_types.clone())
    }
}

/// Lower-case the media type and drop any parameters.
fn normalize_content_type(raw: &str) -> String {
    raw.split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
