//! # Gate Decision
//!
//! `decide` maps one request to exactly one outcome: forward it to the
//! application, or redirect it to the landing page (clearing the credential
//! cookie when the cookie was present but failed verification).
//!
//! ## Rules (first match wins)
//!
//! 1. Gate disabled → forward
//! 2. Path starts with a public prefix → forward
//! 3. No credential cookie → redirect, nothing cleared
//! 4. Credential verifies → forward; anything else → redirect + clear
//!
//! Rule 4 fails closed: a verifier `Err` and a verifier panic both land on
//! redirect + clear, never on forward.

use crate::{config::GateConfig, credential::CredentialVerifier, error::GateError};
use std::panic::{AssertUnwindSafe, catch_unwind};

// =============================================================================
// DECISION TYPES
// =============================================================================

/// Why a request was let through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardReason {
    Disabled,
    PublicPath,
    ValidCredential,
}

/// Why a request was sent to the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectReason {
    MissingCredential,
    /// Verification returned an error. `detail` is safe to log, never shown to clients.
    InvalidCredential { detail: String },
    /// The verifier panicked.
    VerifierFault,
}

/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Forward(ForwardReason),
    Redirect {
        location: String,
        /// Name of the cookie to clear on the response, if any.
        clear_cookie: Option<String>,
        reason: RedirectReason,
    },
}

impl GateDecision {
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward(_))
    }

    /// Stable label for structured logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Forward(ForwardReason::Disabled) => "disabled",
            Self::Forward(ForwardReason::PublicPath) => "public_path",
            Self::Forward(ForwardReason::ValidCredential) => "valid_credential",
            Self::Redirect {
                reason: RedirectReason::MissingCredential,
                ..
            } => "missing_credential",
            Self::Redirect {
                reason: RedirectReason::InvalidCredential { .. },
                ..
            } => "invalid_credential",
            Self::Redirect {
                reason: RedirectReason::VerifierFault,
                ..
            } => "verifier_fault",
        }
    }
}

// =============================================================================
// DECISION
// =============================================================================

/// Decide whether a request to `path`, carrying credential `token`, may proceed.
pub fn decide(
    config: &GateConfig,
    verifier: &dyn CredentialVerifier,
    path: &str,
    token: Option<&str>,
) -> GateDecision {
    if !config.enabled {
        return GateDecision::Forward(ForwardReason::Disabled);
    }

    if config.public_paths.matches(path) {
        return GateDecision::Forward(ForwardReason::PublicPath);
    }

    let Some(token) = token else {
        return GateDecision::Redirect {
            location: config.landing_path.clone(),
            clear_cookie: None,
            reason: RedirectReason::MissingCredential,
        };
    };

    let verdict = catch_unwind(AssertUnwindSafe(|| verifier.verify(token, &config.secret)));

    let reason = match verdict {
        Ok(Ok(_claims)) => return GateDecision::Forward(ForwardReason::ValidCredential),
        Ok(Err(err)) => RedirectReason::InvalidCredential {
            detail: describe(&err),
        },
        Err(_panic) => RedirectReason::VerifierFault,
    };

    GateDecision::Redirect {
        location: config.landing_path.clone(),
        clear_cookie: Some(config.cookie.name.clone()),
        reason,
    }
}

fn describe(err: &GateError) -> String {
    match err {
        GateError::InvalidCredential(reason) => reason.clone(),
        other => format!("{}: {}", other.kind(), other),
    }
}

// =============================================================================
// TESTS
// =============================================================================
