//! Core pipeline logic for Nutriscan.
//!
//! This crate contains the upload-to-prediction orchestration with ZERO web
//! framework or database dependencies. Outbound collaborators are reached
//! through traits so the API and DB crates can plug in real implementations.
//!
//! # Modules
//!
//! - `storage` - Object store facade (user-scoped writes, privileged signing)
//! - `inference` - Inference gateway (remote HTTP client or stub)
//! - `prediction` - The upload orchestrator and its error taxonomy

pub mod inference;
pub mod prediction;
pub mod storage;
