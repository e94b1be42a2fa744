//! Prediction upload route.

use std::fmt;

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use futures::TryStreamExt;
use nutriscan_core::prediction::{BodyError, PredictionError, UploadSubmission, ValidationError};

use crate::{
    AppState,
    error::ApiError,
    middleware::{AuthUser, CorrelationId},
};

/// Multipart form field carrying the image.
pub const FILE_FIELD: &str = "file";

/// Room for multipart boundaries and part headers on top of the image.
const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Creates the prediction routes.
///
/// The request body limit tracks the configured upload bound, so a client
/// streaming far past it is cut off by the transport.
pub fn routes(state: &AppState) -> Router<AppState> {
    let limit = state
        .predictions
        .policy()
        .max_bytes()
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/predictions", post(create_prediction))
        .layer(DefaultBodyLimit::max(
            usize::try_from(limit).unwrap_or(usize::MAX),
        ))
}

/// POST `/predictions`
/// Upload one image and classify it.
async fn create_prediction(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    CorrelationId(request_id): CorrelationId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(_) => return reject(ValidationError::MissingFile, request_id),
    };

    let max_bytes = state.predictions.policy().max_bytes();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => {
                let upload = UploadSubmission {
                    filename: field.file_name().map(str::to_owned),
                    content_type: field.content_type().map(str::to_owned),
                    body: field.map_err(FieldError),
                };

                return match state.predictions.submit(&identity, upload, &request_id).await {
                    Ok(response) => (StatusCode::OK, Json(response)).into_response(),
                    Err(e) => ApiError::new(e, request_id).into_response(),
                };
            }
            Ok(Some(_)) => continue,
            Ok(None) => return reject(ValidationError::MissingFile, request_id),
            Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                return reject(ValidationError::TooLarge { max_bytes }, request_id);
            }
            Err(e) => return reject(ValidationError::Unreadable(e.body_text()), request_id),
        }
    }
}

/// Stream error of the `file` part.
struct FieldError(MultipartError);

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.body_text())
    }
}

impl BodyError for FieldError {
    fn exceeded_limit(&self) -> bool {
        self.0.status() == StatusCode::PAYLOAD_TOO_LARGE
    }
}

fn reject(error: ValidationError, request_id: String) -> Response {
    ApiError::new(PredictionError::Validation(error), request_id).into_response()
}
