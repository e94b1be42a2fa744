//! Unit tests for configuration loading.

#[cfg(test)]
mod tests {
    use crate::config::{AppConfig, InferenceConfig, UploadConfig};

    fn required_vars() -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("NUTRISCAN__DATABASE__URL", Some("postgres://localhost/nutriscan")),
            ("NUTRISCAN__AUTH__JWT_SECRET", Some("super-secret")),
            ("NUTRISCAN__AUTH__ISSUER", Some("https://project.supabase.co")),
            (
                "NUTRISCAN__STORAGE__ENDPOINT",
                Some("https://project.supabase.co/storage/v1/s3"),
            ),
            ("NUTRISCAN__STORAGE__USER_ACCESS_KEY_ID", Some("project")),
            ("NUTRISCAN__STORAGE__USER_SECRET_ACCESS_KEY", Some("anon-key")),
            ("NUTRISCAN__STORAGE__SERVICE_ACCESS_KEY_ID", Some("service-id")),
            ("NUTRISCAN__STORAGE__SERVICE_SECRET_ACCESS_KEY", Some("service-key")),
        ]
    }

    #[test]
    fn test_load_applies_defaults() {
        temp_env::with_vars(required_vars(), || {
            let config = AppConfig::load().expect("config should load");

            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 8080);
            assert_eq!(config.database.max_connections, 10);
            assert_eq!(config.auth.jwt_audience, "authenticated");
            assert_eq!(config.storage.bucket, "uploads");
            assert_eq!(config.storage.inference_url_ttl_secs, 120);
            assert_eq!(config.storage.viewer_url_ttl_secs, 86400);
            assert_eq!(config.upload.max_bytes, 5 * 1024 * 1024);
            assert_eq!(
                config.upload.allowed_content_types,
                vec!["image/jpeg".to_string(), "image/png".to_string()]
            );
            assert!(config.inference.is_stub());
            assert_eq!(config.inference.timeout_secs, 15);
        });
    }

    #[test]
    fn test_load_reads_overrides() {
        let mut vars = required_vars();
        vars.push(("NUTRISCAN__SERVER__PORT", Some("9090")));
        vars.push(("NUTRISCAN__STORAGE__BUCKET", Some("scans")));
        vars.push(("NUTRISCAN__INFERENCE__BASE_URL", Some("http://ml:8000")));
        vars.push(("NUTRISCAN__INFERENCE__TIMEOUT_SECS", Some("3")));
        vars.push(("NUTRISCAN__UPLOAD__MAX_BYTES", Some("1024")));
        vars.push((
            "NUTRISCAN__UPLOAD__ALLOWED_CONTENT_TYPES",
            Some("image/png,image/webp"),
        ));

        temp_env::with_vars(vars, || {
            let config = AppConfig::load().expect("config should load");

            assert_eq!(config.server.port, 9090);
            assert_eq!(config.storage.bucket, "scans");
            assert!(!config.inference.is_stub());
            assert_eq!(config.inference.base_url, "http://ml:8000");
            assert_eq!(config.inference.timeout_secs, 3);
            assert_eq!(config.upload.max_bytes, 1024);
            assert_eq!(
                config.upload.allowed_content_types,
                vec!["image/png".to_string(), "image/webp".to_string()]
            );
        });
    }

    #[test]
    fn test_load_fails_without_auth_secret() {
        let vars: Vec<_> = required_vars()
            .into_iter()
            .map(|(key, value)| {
                if key == "NUTRISCAN__AUTH__JWT_SECRET" {
                    (key, None)
                } else {
                    (key, value)
                }
            })
            .collect();

        temp_env::with_vars(vars, || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_blank_base_url_is_stub() {
        let config = InferenceConfig {
            base_url: "   ".to_string(),
            ..InferenceConfig::default()
        };
        assert!(config.is_stub());
    }

    #[test]
    fn test_upload_config_default() {
        let config = UploadConfig::default();
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.allowed_content_types.len(), 2);
    }
}
