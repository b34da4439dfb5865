//! # beta-gate-core
//!
//! The stateless access-gate decision for Beta Gate - THE DECISION.
//!
//! Every inbound request is either forwarded to the application unchanged or
//! redirected to the access-request (landing) page. The decision is a pure
//! function of:
//! - the feature flag
//! - the request path and the public path set
//! - the credential cookie, if any
//! - the shared secret used to verify that cookie
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network, NO environment lookups (the app crate builds
//!   the configuration once and injects it)
//! - Verification sits behind [`CredentialVerifier`] so the decision can be
//!   exercised with fakes
//! - Fail closed: any verifier error or panic resolves to a redirect that
//!   clears the credential

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod cookie;
pub mod credential;
pub mod error;
pub mod gate;
pub mod secret;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use config::{
    DEFAULT_COOKIE_NAME, DEFAULT_FAVICON_PATH, DEFAULT_ISSUANCE_PATH, DEFAULT_LANDING_PATH,
    DEFAULT_TOKEN_TTL_SECS, Environment, GateConfig, HEALTH_PATH, PublicPaths,
};
pub use cookie::{CookieSettings, find_cookie};
pub use credential::{ACCESS_SUBJECT, AccessClaims, CredentialVerifier, JwtCredentials};
pub use error::GateError;
pub use gate::{ForwardReason, GateDecision, RedirectReason, decide};
pub use secret::{DEFAULT_SECRET, SharedSecret};
