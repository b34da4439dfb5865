//! # Credential Issuance
//!
//! `POST /api/beta-auth` exchanges the shared beta password for a signed
//! access credential stored in the `BETA_ACCESS_TOKEN` cookie.
//!
//! ## Configuration
//!
//! - `BETA_GATE_PASSWORD`: the shared password. If unset, issuance answers
//!   `503` and only credentials minted out of band (`beta-gate issue`) work.
//!
//! ## Responses
//!
//! - correct password → `303` to `/` with `Set-Cookie`
//! - wrong password → `303` to the landing page with `?error=invalid`

use super::{AppState, types::BetaAuthForm};
use axum::{
    Form,
    extract::State,
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use beta_gate_core::GateError;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// Where a visitor lands after a successful login.
const AFTER_LOGIN_PATH: &str = "/";

/// Current time in Unix seconds.
pub fn unix_now() -> Result<u64, GateError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| GateError::Io(format!("System time error: {}", e)))
}

/// Constant-time byte comparison.
///
/// Both inputs are padded to the same length so `ct_eq` always runs over the
/// same number of bytes and the comparison time does not leak the length.
pub fn constant_time_eq(provided: &[u8], expected: &[u8]) -> bool {
    let max_len = provided.len().max(expected.len());
    let mut padded_provided = vec![0u8; max_len];
    let mut padded_expected = vec![0u8; max_len];
    padded_provided[..provided.len()].copy_from_slice(provided);
    padded_expected[..expected.len()].copy_from_slice(expected);

    let bytes_match: bool = padded_provided.ct_eq(&padded_expected).into();
    bytes_match && provided.len() == expected.len()
}

/// Credential issuance handler.
pub async fn issue_handler(
    State(state): State<AppState>,
    Form(form): Form<BetaAuthForm>,
) -> Response {
    let gate = &state.config.gate;

    let Some(expected) = state.config.password.as_ref() else {
        tracing::warn!(
            event = "issuance_rejected",
            reason = "issuance_disabled",
            "Credential requested but no beta password is configured"
        );
        return (StatusCode::SERVICE_UNAVAILABLE, "Access requests are closed").into_response();
    };

    if !constant_time_eq(
        form.password.as_bytes(),
        expected.expose_secret().as_bytes(),
    ) {
        tracing::warn!(
            event = "issuance_rejected",
            reason = "invalid_password",
            "Credential request with wrong password"
        );
        return Redirect::to(&format!("{}?error=invalid", gate.landing_path)).into_response();
    }

    let token = match unix_now()
        .and_then(|now| state.credentials.issue(&gate.secret, now, gate.cookie.max_age_secs))
    {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(event = "issuance_failed", kind = e.kind(), "{}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Could not issue credential")
                .into_response();
        }
    };

    tracing::info!(
        event = "credential_issued",
        ttl_secs = gate.cookie.max_age_secs,
        "Beta access credential issued"
    );

    (
        AppendHeaders([(header::SET_COOKIE, gate.cookie.set_cookie(&token))]),
        Redirect::to(AFTER_LOGIN_PATH),
    )
        .into_response()
}

// =============================================================================
// TESTS
// =============================================================================
