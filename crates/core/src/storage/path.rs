//! Object keys for uploaded images.

use std::fmt;

use uuid::Uuid;

/// Filename used when the client sent none, or nothing survived sanitizing.
const FALLBACK_FILENAME: &str = "upload";

/// Storage key of one uploaded image.
///
/// Format: `{subject}/{upload_id}_{sanitized_filename}`. The upload ID is a
/// fresh v4 UUID per upload, so concurrent uploads from the same subject
/// never share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredObjectPath(String);

impl StoredObjectPath {
    /// Generate a fresh path for an upload by `subject`.
    #[must_use]
    pub fn generate(subject: &str, filename: Option<&str>) -> Self {
        Self::with_id(subject, Uuid::new_v4(), filename)
    }

    /// Build a path from an explicit upload ID.
    #[must_use]
    pub fn with_id(subject: &str, upload_id: Uuid, filename: Option<&str>) -> Self {
        let filename = filename
            .map(sanitize_filename)
            .filter(|name| !name.trim_matches(['.', '_']).is_empty())
            .unwrap_or_else(|| FALLBACK_FILENAME.to_string());

        Self(format!("{subject}/{upload_id}_{filename}"))
    }

    /// The key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoredObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
