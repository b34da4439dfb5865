//! # Gate Middleware
//!
//! Applies [`decide`] to every request before any protected handler runs.
//!
//! - `Forward` → the request continues unchanged
//! - `Redirect` → `302 Found` to the landing page, plus one `Set-Cookie`
//!   clearing the credential when it was present but invalid
//!
//! Verification failures never reach the client as errors.

use super::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use beta_gate_core::{CookieSettings, GateDecision, RedirectReason, decide, find_cookie};

/// Gate middleware. Installed around all routes and the fallback.
pub async fn gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let gate = &state.config.gate;

    let decision = {
        let cookies = request
            .headers()
            .get_all(header::COOKIE)
            .iter()
            .map(HeaderValue::as_bytes);
        let token = find_cookie(cookies, &gate.cookie.name);
        decide(
            gate,
            state.verifier.as_ref(),
            request.uri().path(),
            token.as_deref(),
        )
    };

    match &decision {
        GateDecision::Forward(_) => {
            tracing::trace!(
                path = %request.uri().path(),
                reason = decision.reason(),
                "Gate forward"
            );
            next.run(request).await
        }
        GateDecision::Redirect {
            location,
            clear_cookie,
            reason,
        } => {
            match reason {
                RedirectReason::MissingCredential => tracing::debug!(
                    event = "gate_redirect",
                    reason = decision.reason(),
                    path = %request.uri().path(),
                    "No credential, redirecting to landing page"
                ),
                RedirectReason::InvalidCredential { detail } => tracing::warn!(
                    event = "gate_redirect",
                    reason = decision.reason(),
                    detail = %detail,
                    path = %request.uri().path(),
                    "Credential rejected, clearing cookie"
                ),
                RedirectReason::VerifierFault => tracing::error!(
                    event = "gate_redirect",
                    reason = decision.reason(),
                    path = %request.uri().path(),
                    "Credential verifier panicked, failing closed"
                ),
            }

            let clear = clear_cookie.as_ref().map(|name| {
                CookieSettings {
                    name: name.clone(),
                    ..gate.cookie.clone()
                }
                .clear_cookie()
            });
            redirect_response(location, clear.as_deref())
        }
    }
}

/// `302 Found` to `location`, optionally with one `Set-Cookie` value.
fn redirect_response(location: &str, set_cookie: Option<&str>) -> Response {
    let mut response = StatusCode::FOUND.into_response();
    let headers = response.headers_mut();

    match HeaderValue::from_str(location) {
        Ok(value) => {
            headers.insert(header::LOCATION, value);
        }
        Err(e) => {
            // Landing path is validated at startup; never forward on failure.
            tracing::error!("Unusable landing location '{}': {}", location, e);
            return StatusCode::FORBIDDEN.into_response();
        }
    }

    if let Some(cookie) = set_cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                headers.insert(header::SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Unusable clear-cookie header: {}", e),
        }
    }

    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

// =============================================================================
// TESTS
// =============================================================================
