//! # Shared Secret
//!
//! Redacting wrapper around the key used to sign and verify credentials.

use std::fmt;

/// Well-known fallback secret used when none is configured.
///
/// Anyone who knows this value can mint credentials. It is accepted outside
/// production with a startup warning and rejected in production.
pub const DEFAULT_SECRET: &str = "beta-gate-dev-secret-change-me";

/// The process-wide credential signing secret.
///
/// `Debug` and `Display` always print `[REDACTED]`; the raw value is only
/// reachable through [`expose_secret`](Self::expose_secret). Not `Clone`:
/// share it behind the `Arc` that holds the whole configuration.
pub struct SharedSecret {
    inner: String,
}

impl SharedSecret {
    /// Wrap a configured secret.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// The well-known fallback secret.
    pub fn fallback() -> Self {
        Self::new(DEFAULT_SECRET)
    }

    /// Explicitly expose the raw secret bytes for signing or verification.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Whether this is the well-known fallback value.
    pub fn is_default(&self) -> bool {
        self.inner == DEFAULT_SECRET
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for SharedSecret {
    fn default() -> Self {
        Self::fallback()
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// =============================================================================
// TESTS
// =============================================================================
