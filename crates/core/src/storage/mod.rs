//! Object store facade over Apache OpenDAL.
//!
//! One bucket, two capability views:
//! - a user view, built per request from the caller's delegated token, so the
//!   storage provider's own access policies decide whether a write is allowed
//! - a privileged view, built once at startup, used only to sign read URLs
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────────────────┐
//! │ user_view(token)             │ privileged_view()                │
//! │   op.write_with(key, bytes)  │   op.presign_read(key, ttl)      │
//! │   (caller's permissions)     │   (system trust anchor)          │
//! └──────────────────────────────┴──────────────────────────────────┘
//! ```

mod config;
mod error;
mod path;
mod service;

pub use config::{S3Credentials, StorageConfig};
pub use error::StorageError;
pub use path::StoredObjectPath;
pub use service::{ObjectSigner, ObjectStore, ObjectUploader, SignedUrl, StorageService};
