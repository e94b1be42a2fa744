//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - A `PredictionRepository` that writes under the caller's own identity
//! - Row-level security context management
//!
//! Schema and policies are managed outside this crate.

pub mod entities;
pub mod repositories;
pub mod rls;

pub use repositories::SeaOrmPredictionRepository;
pub use rls::RlsConnection;

use std::time::Duration;

use nutriscan_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a connection pool to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    Database::connect(options).await
}
