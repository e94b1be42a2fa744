//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token verification configuration.
    pub auth: AuthConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Upload constraints.
    #[serde(default)]
    pub upload: UploadConfig,
    /// Inference upstream configuration.
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Bearer token verification configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret shared with the identity provider.
    pub jwt_secret: String,
    /// Expected `aud` claim.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Trust root the `iss` claim must reference (the identity provider's base URL).
    pub issuer: String,
}

fn default_audience() -> String {
    "authenticated".to_string()
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// S3-compatible endpoint URL.
    pub endpoint: String,
    /// Region reported to the S3 endpoint.
    #[serde(default = "default_region")]
    pub region: String,
    /// Bucket holding uploaded images.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Access key paired with the caller's session token.
    pub user_access_key_id: String,
    /// Secret paired with the caller's session token.
    pub user_secret_access_key: String,
    /// Privileged access key, used for URL signing only.
    pub service_access_key_id: String,
    /// Privileged secret, used for URL signing only.
    pub service_secret_access_key: String,
    /// Lifetime of the URL handed to the inference upstream.
    #[serde(default = "default_inference_url_ttl")]
    pub inference_url_ttl_secs: u64,
    /// Lifetime of the URL returned to the caller.
    #[serde(default = "default_viewer_url_ttl")]
    pub viewer_url_ttl_secs: u64,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_bucket() -> String {
    "uploads".to_string()
}

fn default_inference_url_ttl() -> u64 {
    120 // 2 minutes
}

fn default_viewer_url_ttl() -> u64 {
    86400 // 24 hours
}

/// Upload constraints.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
    /// Accepted content types.
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
            allowed_content_types: default_allowed_content_types(),
        }
    }
}

fn default_max_bytes() -> u64 {
    5 * 1024 * 1024 // 5 MiB
}

fn default_allowed_content_types() -> Vec<String> {
    vec!["image/jpeg".to_string(), "image/png".to_string()]
}

/// Inference upstream configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the inference service. Empty selects the stub.
    #[serde(default)]
    pub base_url: String,
    /// Optional shared secret sent as `X-API-Key`.
    #[serde(default)]
    pub api_key: String,
    /// Deadline for a single inference call.
    #[serde(default = "default_inference_timeout")]
    pub timeout_secs: u64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_inference_timeout(),
        }
    }
}

fn default_inference_timeout() -> u64 {
    15
}

impl InferenceConfig {
    /// Returns true when no upstream is configured and the stub should be used.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.base_url.trim().is_empty()
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("NUTRISCAN")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_content_types")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
