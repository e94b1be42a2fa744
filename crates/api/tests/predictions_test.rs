//! Router tests for the prediction and health endpoints.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

use nutriscan_api::{AppState, create_router};
use nutriscan_core::inference::{InferenceError, InferenceGateway, Prediction};
use nutriscan_core::prediction::{
    PredictionRecord, PredictionRepository, PredictionService, RepositoryError, UploadPolicy,
};
use nutriscan_core::storage::{
    ObjectSigner, ObjectStore, ObjectUploader, SignedUrl, StorageError, StoredObjectPath,
};
use nutriscan_shared::{AuthConfig, Identity, IdentityVerifier};

const SECRET: &str = "router-test-secret";
const ISSUER: &str = "https://project.supabase.co";
const BOUNDARY: &str = "nutriscan-test-boundary";

#[derive(Default)]
struct Recorder {
    uploads: Mutex<Vec<StoredObjectPath>>,
    rows: Mutex<Vec<PredictionRecord>>,
    inference_request_ids: Mutex<Vec<String>>,
}

struct FakeStore(Arc<Recorder>);

struct FakeUploader(Arc<Recorder>);

#[async_trait]
impl ObjectUploader for FakeUploader {
    async fn upload(
        &self,
        path: &StoredObjectPath,
        _bytes: Bytes,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        self.0.uploads.lock().unwrap().push(path.clone());
        Ok(())
    }
}

struct FakeSigner;

#[async_trait]
impl ObjectSigner for FakeSigner {
    async fn sign(
        &self,
        path: &StoredObjectPath,
        ttl: Duration,
    ) -> Result<SignedUrl, StorageError> {
        Ok(SignedUrl {
            url: format!("https://storage.local/{path}?ttl={}", ttl.as_secs()),
            expires_at: Utc::now(),
        })
    }
}

static SIGNER: FakeSigner = FakeSigner;

impl ObjectStore for FakeStore {
    fn user_view(&self, _delegated_token: &str) -> Result<Box<dyn ObjectUploader>, StorageError> {
        Ok(Box::new(FakeUploader(self.0.clone())))
    }

    fn privileged_view(&self) -> &dyn ObjectSigner {
        &SIGNER
    }

    fn inference_url_ttl(&self) -> Duration {
        Duration::from_secs(120)
    }

    fn viewer_url_ttl(&self) -> Duration {
        Duration::from_secs(86_400)
    }
}

struct FakeInference {
    recorder: Arc<Recorder>,
    failure: Option<fn() -> InferenceError>,
}

#[async_trait]
impl InferenceGateway for FakeInference {
    async fn classify(
        &self,
        _image_url: &str,
        request_id: &str,
    ) -> Result<Prediction, InferenceError> {
        self.recorder
            .inference_request_ids
            .lock()
            .unwrap()
            .push(request_id.to_string());
        match self.failure {
            Some(make_error) => Err(make_error()),
            None => Ok(Prediction::new("healthy", 0.9)),
        }
    }
}

struct FakeRepository(Arc<Recorder>);

#[async_trait]
impl PredictionRepository for FakeRepository {
    async fn insert(
        &self,
        _identity: &Identity,
        record: &PredictionRecord,
    ) -> Result<(), RepositoryError> {
        self.0.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}

fn app(policy: UploadPolicy, failure: Option<fn() -> InferenceError>) -> (Router, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let service = PredictionService::new(
        Arc::new(FakeStore(recorder.clone())),
        Arc::new(FakeInference {
            recorder: recorder.clone(),
            failure,
        }),
        Arc::new(FakeRepository(recorder.clone())),
        policy,
    );
    let verifier = IdentityVerifier::new(AuthConfig {
        jwt_secret: SECRET.to_string(),
        jwt_audience: "authenticated".to_string(),
        issuer: ISSUER.to_string(),
    });

    let state = AppState {
        verifier: Arc::new(verifier),
        predictions: Arc::new(service),
    };
    (create_router(state), recorder)
}

fn token(secret: &str) -> String {
    let claims = json!({
        "sub": "user-123",
        "email": "demo@example.com",
        "iss": format!("{ISSUER}/auth/v1"),
        "aud": "authenticated",
        "exp": (Utc::now() + chrono::Duration::hours(1)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn multipart_body(field: &str, filename: &str, content_type: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: {content_type}\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(auth: Option<&str>, request_id: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/predictions")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    if let Some(request_id) = request_id {
        builder = builder.header("x-request-id", request_id);
    }
    builder.body(Body::from(body)).unwrap()
}

fn jpeg_upload(auth: Option<&str>, request_id: Option<&str>) -> Request<Body> {
    upload_request(
        auth,
        request_id,
        multipart_body("file", "img.jpg", "image/jpeg", b"123"),
    )
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn response_request_id(response: &axum::response::Response) -> String {
    response.headers()["x-request-id"]
        .to_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app(UploadPolicy::default(), None);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_upload_success() {
    let (app, recorder) = app(UploadPolicy::default(), None);
    let auth = format!("Bearer {}", token(SECRET));

    let response = app
        .oneshot(jpeg_upload(Some(&auth), Some("req-abc")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_request_id(&response), "req-abc");

    let body = json_body(response).await;
    assert_eq!(body["prediction"]["label"], "healthy");
    assert_eq!(body["request_id"], "req-abc");
    assert!(
        body["image_url"]
            .as_str()
            .unwrap()
            .ends_with("?ttl=86400")
    );

    let rows = recorder.rows.lock().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].user_id, "user-123");
    assert!(rows[0].image_path.starts_with("user-123/"));
    assert!(rows[0].image_path.ends_with("_img.jpg"));
    assert_eq!(*recorder.inference_request_ids.lock().unwrap(), vec!["req-abc"]);
}

#[rstest]
#[case::missing(None, "Missing Bearer token")]
#[case::wrong_scheme(Some("Basic dXNlcjpwYXNz".to_string()), "Missing Bearer token")]
#[case::bad_signature(
    Some(format!("Bearer {}", token("some-other-secret"))),
    "Invalid auth token"
)]
#[tokio::test]
async fn test_unauthenticated_upload_is_rejected(
    #[case] auth: Option<String>,
    #[case] message: &str,
) {
    let (app, recorder) = app(UploadPolicy::default(), None);

    let response = app
        .oneshot(jpeg_upload(auth.as_deref(), Some("req-401")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response_request_id(&response), "req-401");

    let body = json_body(response).await;
    assert_eq!(body["error"], "unauthorized");
    assert!(body["message"].as_str().unwrap().starts_with(message));
    assert_eq!(body["request_id"], "req-401");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disallowed_type_is_415() {
    let (app, recorder) = app(UploadPolicy::default(), None);
    let auth = format!("Bearer {}", token(SECRET));

    let response = app
        .oneshot(upload_request(
            Some(&auth),
            None,
            multipart_body("file", "anim.gif", "image/gif", b"GIF89a"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body = json_body(response).await;
    assert_eq!(body["error"], "unsupported_media_type");
    assert_eq!(body["message"], "Only JPEG/PNG allowed");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_413() {
    let (app, recorder) = app(UploadPolicy::default().with_max_bytes(16), None);
    let auth = format!("Bearer {}", token(SECRET));

    let response = app
        .oneshot(upload_request(
            Some(&auth),
            None,
            multipart_body("file", "img.png", "image/png", &[7u8; 17]),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"], "payload_too_large");
    assert_eq!(body["message"], "Max size 16 bytes");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_body_past_transport_limit_is_413() {
    let (app, recorder) = app(UploadPolicy::default().with_max_bytes(16), None);
    let auth = format!("Bearer {}", token(SECRET));

    // A text part larger than the multipart allowance, then a small valid image.
    let mut body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"note\"\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(&[b'n'; 70 * 1024]);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(&multipart_body("file", "img.png", "image/png", b"123"));

    let response = app
        .oneshot(upload_request(Some(&auth), None, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert_eq!(body["error"], "payload_too_large");
    assert_eq!(body["message"], "Max size 16 bytes");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_file_field_is_400() {
    let (app, recorder) = app(UploadPolicy::default(), None);
    let auth = format!("Bearer {}", token(SECRET));

    let response = app
        .oneshot(upload_request(
            Some(&auth),
            None,
            multipart_body("picture", "img.jpg", "image/jpeg", b"123"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["message"], "Missing file upload");
    assert!(recorder.uploads.lock().unwrap().is_empty());
}

#[rstest]
#[case::bad_input(|| InferenceError::BadInput { status: 422 }, StatusCode::BAD_REQUEST, "bad_request")]
#[case::timeout(|| InferenceError::Timeout, StatusCode::GATEWAY_TIMEOUT, "upstream_timeout")]
#[case::gateway(|| InferenceError::gateway("boom"), StatusCode::BAD_GATEWAY, "inference_unavailable")]
#[tokio::test]
async fn test_inference_failures_map_to_status(
    #[case] failure: fn() -> InferenceError,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let (app, recorder) = app(UploadPolicy::default(), Some(failure));
    let auth = format!("Bearer {}", token(SECRET));

    let response = app
        .oneshot(jpeg_upload(Some(&auth), Some("req-inf")))
        .await
        .unwrap();

    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    assert_eq!(body["error"], code);
    assert_eq!(body["request_id"], "req-inf");
    assert_eq!(recorder.uploads.lock().unwrap().len(), 1);
    assert!(recorder.rows.lock().unwrap().is_empty());
}

#[rstest]
#[case::absent(None)]
#[case::blank(Some(""))]
#[tokio::test]
async fn test_request_id_is_generated(#[case] sent: Option<&str>) {
    let (app, recorder) = app(UploadPolicy::default(), None);
    let auth = format!("Bearer {}", token(SECRET));

    let response = app.oneshot(jpeg_upload(Some(&auth), sent)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let header_id = response_request_id(&response);
    assert!(uuid::Uuid::parse_str(&header_id).is_ok());

    let body = json_body(response).await;
    assert_eq!(body["request_id"], header_id.as_str());
    assert_eq!(
        *recorder.inference_request_ids.lock().unwrap(),
        vec![header_id]
    );
}
