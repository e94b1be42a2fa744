//! Shared configuration, identity, and error types for Nutriscan.
//!
//! This crate provides common types used across all other crates:
//! - Application configuration loaded once at startup
//! - The public error taxonomy returned to API callers
//! - The verified caller `Identity` and the JWT `IdentityVerifier`

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

#[cfg(test)]
mod config_tests;

pub use auth::{Claims, Identity};
pub use config::{
    AppConfig, AuthConfig, DatabaseConfig, InferenceConfig, ServerConfig, StorageSettings,
    UploadConfig,
};
pub use error::{AppError, AppResult, Upstream};
pub use jwt::{AuthError, IdentityVerifier};
