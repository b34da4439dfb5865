//! # Request/Response Types
//!
//! Form, query and JSON structures used by the gate's own endpoints.

use serde::{Deserialize, Serialize};

// =============================================================================
// ISSUANCE FORM
// =============================================================================

/// Body of `POST /api/beta-auth` (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetaAuthForm {
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// LANDING PAGE QUERY
// =============================================================================

/// Query string of the landing page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandingQuery {
    /// Set to `invalid` after a failed password attempt.
    pub error: Option<String>,
}

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub gate_enabled: bool,
}

impl HealthResponse {
    pub fn ok(gate_enabled: bool) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            gate_enabled,
        }
    }
}
