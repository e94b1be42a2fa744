//! Bearer token verification.
//!
//! Tokens are issued by an external identity provider and signed with a
//! shared HS256 secret. Verification requires `exp`, `iss` and `aud`; a
//! token missing any of them is rejected even if its signature is valid.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use thiserror::Error;

use crate::auth::{Claims, Identity};
use crate::config::AuthConfig;
use crate::error::AppError;

/// Claims that must be present on every accepted token.
const REQUIRED_CLAIMS: [&str; 3] = ["exp", "iss", "aud"];

/// Errors that can occur while verifying a credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No bearer credential was presented.
    #[error("missing bearer token")]
    MissingToken,

    /// Token has expired.
    #[error("token has expired")]
    Expired,

    /// Token was issued for another audience.
    #[error("invalid token audience")]
    InvalidAudience,

    /// Token issuer does not reference the configured trust root.
    #[error("invalid token issuer")]
    InvalidIssuer,

    /// A required claim is absent.
    #[error("missing required claim: {0}")]
    MissingClaim(String),

    /// Token carries no subject.
    #[error("token has no subject")]
    MissingSubject,

    /// Authenticated caller has no token to delegate downstream.
    #[error("authenticated caller has no delegated token")]
    MissingDelegatedToken,

    /// Token is malformed or its signature does not verify.
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => Self::Unauthorized("Missing Bearer token".to_string()),
            AuthError::MissingDelegatedToken => {
                Self::Unauthorized("Invalid authentication context".to_string())
            }
            e => Self::Unauthorized(format!("Invalid auth token: {e}")),
        }
    }
}

/// Verifies bearer credentials and derives the caller `Identity`.
#[derive(Clone)]
pub struct IdentityVerifier {
    config: AuthConfig,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for IdentityVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityVerifier")
            .field("audience", &self.config.jwt_audience)
            .field("issuer", &self.config.issuer)
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl IdentityVerifier {
    /// Creates a verifier for the given trust configuration.
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.jwt_audience.as_str()]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);

        Self {
            config,
            decoding_key,
            validation,
        }
    }

    /// Verifies a credential and extracts the caller identity.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` when the token is missing, malformed, expired,
    /// addressed to another audience, issued outside the trust root, or
    /// lacks a subject.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidAudience => AuthError::InvalidAudience,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::MissingRequiredClaim(claim) => AuthError::MissingClaim(claim.clone()),
                _ => AuthError::Invalid(e.to_string()),
            })?;

        if !self.issuer_trusted(claims.iss.as_deref().unwrap_or_default()) {
            return Err(AuthError::InvalidIssuer);
        }

        let subject = claims.sub.ok_or(AuthError::MissingSubject)?;
        Identity::new(subject, claims.email, token)
    }

    fn issuer_trusted(&self, iss: &str) -> bool {
        let root = self.config.issuer.trim();
        !root.is_empty() && iss.contains(root)
    }
}
