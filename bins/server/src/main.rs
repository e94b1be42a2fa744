//! nutriscan API server
//!
//! Main entry point for the image screening backend.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nutriscan_api::{AppState, create_router};
use nutriscan_core::inference::InferenceBackend;
use nutriscan_core::prediction::{PredictionService, UploadPolicy};
use nutriscan_core::storage::{StorageConfig, StorageService};
use nutriscan_db::{SeaOrmPredictionRepository, connect};
use nutriscan_shared::{AppConfig, IdentityVerifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutriscan=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration once; nothing below mutates it
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    let verifier = IdentityVerifier::new(config.auth.clone());

    let storage = StorageService::from_config(StorageConfig::from(&config.storage))
        .context("Failed to initialize object storage")?;
    info!(
        endpoint = %config.storage.endpoint,
        bucket = %storage.bucket(),
        "Object storage configured"
    );

    let inference = InferenceBackend::from_config(&config.inference)
        .context("Failed to initialize inference client")?;
    if inference.is_stub() {
        warn!("No inference base URL configured, serving stub predictions");
    } else {
        info!(base_url = %config.inference.base_url, "Inference upstream configured");
    }

    let predictions = PredictionService::new(
        Arc::new(storage),
        Arc::new(inference),
        Arc::new(SeaOrmPredictionRepository::new(db)),
        UploadPolicy::from(&config.upload),
    );

    // Create application state
    let state = AppState {
        verifier: Arc::new(verifier),
        predictions: Arc::new(predictions),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
