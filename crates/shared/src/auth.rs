//! Authentication types: token claims and the verified caller identity.

use serde::{Deserialize, Serialize};

use crate::jwt::AuthError;

/// Claims carried by a bearer token issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// User email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issuer.
    ///
    /// Registered claims are optional here so that a token lacking one is
    /// reported by the verifier as a missing claim, not as a decode error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience, either a single value or a list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<serde_json::Value>,
    /// Expiration timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Database role the provider assigned to the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Verified caller context, derived once per request.
///
/// The delegated token is the caller's own credential, forwarded to
/// downstream services so they enforce the caller's permissions.
#[derive(Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
    email: Option<String>,
    delegated_token: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("subject", &self.subject)
            .field("email", &self.email)
            .field("delegated_token", &"[hidden]")
            .finish()
    }
}

impl Identity {
    /// Creates an identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingSubject` for a blank subject and
    /// `AuthError::MissingDelegatedToken` for a blank delegated token.
    pub fn new(
        subject: impl Into<String>,
        email: Option<String>,
        delegated_token: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(AuthError::MissingSubject);
        }
        let delegated_token = delegated_token.into();
        if delegated_token.trim().is_empty() {
            return Err(AuthError::MissingDelegatedToken);
        }
        Ok(Self {
            subject,
            email,
            delegated_token,
        })
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the user's email, when the token carried one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the token forwarded to downstream services.
    ///
    /// Never log this value.
    #[must_use]
    pub fn delegated_token(&self) -> &str {
        &self.delegated_token
    }
}
