//! Authentication seam.
//!
//! Login, session issuance, and token storage are external collaborators;
//! this module only defines what a verified caller looks like ([`Claims`])
//! and the trait a caller supplies to turn a bearer token into one
//! ([`TokenVerifier`]). A deterministic verifier is provided for tests and
//! for standalone/offline operation.

use crate::error::{DocError, Result};
use serde::{Deserialize, Serialize};

/// A registered user, scoped to a single role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Assigned user ID.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Role name (must reference a row in `roles`).
    pub role: String,
    /// Upload quota in bytes.
    pub quota_bytes: u64,
    /// Unix timestamp the user was created.
    pub created_at: i64,
}

/// The identity and role a caller presented, once a token has been verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Username the token was issued to.
    pub username: String,
    /// Role the caller is acting as.
    pub role: String,
    /// Operation capability strings embedded in the token (e.g.
    /// `files.upload`). A single `"*"` entry grants every capability.
    pub permissions: Vec<String>,
}

impl Claims {
    /// Whether these claims carry `capability`, honoring the `*` wildcard.
    #[must_use]
    pub fn has_permission(&self, capability: &str) -> bool {
        self.permissions.iter().any(|p| p == "*" || p == capability)
    }
}

/// Verifies a bearer token and returns the caller's claims.
///
/// Implementations typically validate a signature and expiry against an
/// external identity provider; this crate only consumes the result.
pub trait TokenVerifier: Send + Sync {
    /// Verifies `token`, returning the caller's claims.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::AuthError`] if the token is missing, malformed, or expired.
    fn verify(&self, token: &str) -> Result<Claims>;
}

/// A `TokenVerifier` that accepts `"<username>:<role>[:<perm1,perm2,...>]"`
/// tokens verbatim.
///
/// Used for local development, tests, and `full` = false offline operation
/// where no external identity provider is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticTokenVerifier;

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Result<Claims> {
        let mut parts = token.splitn(3, ':');
        let username = parts
            .next()
            .ok_or_else(|| DocError::AuthError("malformed token: expected 'username:role'".to_string()))?;
        let role = parts
            .next()
            .ok_or_else(|| DocError::AuthError("malformed token: expected 'username:role'".to_string()))?;
        if username.is_empty() || role.is_empty() {
            return Err(DocError::AuthError("empty username or role".to_string()).into());
        }
        let permissions = parts
            .next()
            .map(|p| p.split(',').filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        Ok(Claims {
            username: username.to_string(),
            role: role.to_string(),
            permissions,
        })
    }
}
