//! Prediction repository for database operations.

use async_trait::async_trait;
use nutriscan_core::prediction::{PredictionRecord, PredictionRepository, RepositoryError};
use nutriscan_shared::Identity;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, Set};
use tracing::debug;
use uuid::Uuid;

use crate::entities::predictions;
use crate::rls::RlsConnection;

/// Prediction repository writing with the caller's row-level permissions.
#[derive(Debug, Clone)]
pub struct SeaOrmPredictionRepository {
    db: DatabaseConnection,
}

impl SeaOrmPredictionRepository {
    /// Creates a new prediction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Builds the row for `record`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prediction cannot be encoded as JSON.
    pub fn active_model(record: &PredictionRecord) -> Result<predictions::ActiveModel, RepositoryError> {
        let result = serde_json::to_value(&record.result)
            .map_err(|e| RepositoryError::database(format!("unable to encode result: {e}")))?;

        Ok(predictions::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(record.user_id.clone()),
            image_path: Set(record.image_path.clone()),
            result: Set(result),
            confidence: Set(record.confidence),
            created_at: Set(chrono::Utc::now().into()),
        })
    }

    async fn insert_as(
        &self,
        identity: &Identity,
        model: predictions::ActiveModel,
    ) -> Result<predictions::Model, DbErr> {
        let rls = RlsConnection::for_identity(&self.db, identity).await?;
        let row = model.insert(rls.transaction()).await?;
        rls.commit().await?;
        Ok(row)
    }
}

#[async_trait]
impl PredictionRepository for SeaOrmPredictionRepository {
    async fn insert(
        &self,
        identity: &Identity,
        record: &PredictionRecord,
    ) -> Result<(), RepositoryError> {
        let model = Self::active_model(record)?;
        let row = self
            .insert_as(identity, model)
            .await
            .map_err(classify_db_error)?;

        debug!(prediction_id = %row.id, user_id = %row.user_id, "Prediction row inserted");
        Ok(())
    }
}

/// Map a database error onto the repository taxonomy.
///
/// Policy rejections surface as `42501` with one of two messages depending
/// on whether the grant or the row policy refused the write.
fn classify_db_error(err: DbErr) -> RepositoryError {
    let message = err.to_string();
    let lowered = message.to_ascii_lowercase();

    if lowered.contains("permission denied") || lowered.contains("row-level security") {
        RepositoryError::PermissionDenied(message)
    } else {
        RepositoryError::Database(message)
    }
}
