//! # Error Types
//!
//! Errors that can occur in Beta Gate.
//!
//! Credential failures (`InvalidCredential`, `Verifier`) are expected branches
//! of normal operation: the gate turns them into a redirect and never shows
//! them to the client. Only configuration errors stop the process, and only
//! at startup.

use thiserror::Error;

/// Errors that can occur in the Beta Gate system.
#[derive(Debug, Error)]
pub enum GateError {
    /// The credential is malformed, wrongly signed, expired, or for another subject.
    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    /// The verification primitive itself failed unexpectedly.
    #[error("Verifier failure: {0}")]
    Verifier(String),

    /// The configuration is malformed or violates an invariant.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The well-known fallback secret is in use where it is not allowed.
    #[error("Refusing to use the default shared secret in a {0} environment")]
    InsecureSecret(String),

    /// An I/O error occurred (config file, socket bind, server loop).
    #[error("I/O error: {0}")]
    Io(String),
}

impl GateError {
    /// Short machine-readable label used in structured log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredential(_) => "invalid_credential",
            Self::Verifier(_) => "verifier_failure",
            Self::Config(_) => "config",
            Self::InsecureSecret(_) => "insecure_secret",
            Self::Io(_) => "io",
        }
    }
}
