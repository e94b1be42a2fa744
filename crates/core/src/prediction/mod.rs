//! Upload-to-prediction pipeline.
//!
//! This module owns the request-scoped orchestration:
//! - Upload validation (content type allow-list, bounded reads)
//! - Storage write with the caller's permissions
//! - Signed URL minting for the inference upstream and for the caller
//! - Inference and record persistence
//! - Mapping of each step's failure onto the public error taxonomy

pub mod error;
pub mod service;
pub mod types;
pub mod validation;


pub use error::{PredictionError, RepositoryError, UrlPurpose, ValidationError};
pub use service::{PredictionRepository, PredictionService};
pub use types::{PredictionRecord, PredictionResponse, UploadSubmission};
pub use validation::{BodyError, UploadPolicy};
