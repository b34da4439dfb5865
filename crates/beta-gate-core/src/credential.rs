//! # Access Credentials
//!
//! The credential is an HS256 JSON Web Token stored in the access cookie.
//! It is self-contained: the gate keeps no server-side session and needs only
//! the shared secret to check a token.
//!
//! Verification is a capability ([`CredentialVerifier`]) so the gate decision
//! can be tested without the real signing algorithm.

use crate::{error::GateError, secret::SharedSecret};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

/// Subject claim carried by every beta access credential.
pub const ACCESS_SUBJECT: &str = "beta-access";

/// Claims inside a beta access credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds).
    pub exp: u64,
}

// =============================================================================
// VERIFIER CAPABILITY
// =============================================================================

/// Checks a credential token against the shared secret.
///
/// `Ok` means signature valid, not expired, correct subject. Every other
/// outcome is an `Err`; the gate treats all of them the same way.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, token: &str, secret: &SharedSecret) -> Result<AccessClaims, GateError>;
}

// =============================================================================
// JWT IMPLEMENTATION
// =============================================================================

/// HS256 JWT issuer and verifier.
#[derive(Debug, Clone)]
pub struct JwtCredentials {
    validation: Validation,
}

impl Default for JwtCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtCredentials {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ACCESS_SUBJECT.to_string());
        validation.leeway = 0;
        Self { validation }
    }

    /// Mint a credential valid from `issued_at` for `ttl_secs` seconds.
    pub fn issue(
        &self,
        secret: &SharedSecret,
        issued_at: u64,
        ttl_secs: u64,
    ) -> Result<String, GateError> {
        if secret.is_empty() {
            return Err(GateError::Config(
                "Cannot issue credentials with an empty secret".to_string(),
            ));
        }

        let claims = AccessClaims {
            sub: ACCESS_SUBJECT.to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_secs),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
        )
        .map_err(|e| GateError::Verifier(format!("Failed to sign credential: {}", e)))
    }
}

impl CredentialVerifier for JwtCredentials {
    fn verify(&self, token: &str, secret: &SharedSecret) -> Result<AccessClaims, GateError> {
        decode::<AccessClaims>(
            token,
            &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            &self.validation,
        )
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => GateError::InvalidCredential("expired".into()),
            ErrorKind::InvalidSignature => GateError::InvalidCredential("bad signature".into()),
            ErrorKind::InvalidSubject => GateError::InvalidCredential("wrong subject".into()),
            ErrorKind::InvalidAlgorithm => GateError::InvalidCredential("wrong algorithm".into()),
            ErrorKind::MissingRequiredClaim(claim) => {
                GateError::InvalidCredential(format!("missing claim '{}'", claim))
            }
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => GateError::InvalidCredential("malformed".into()),
            _ => GateError::Verifier(err.to_string()),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
