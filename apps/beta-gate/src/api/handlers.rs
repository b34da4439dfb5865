//! # Endpoint Handlers
//!
//! The gate's own pages: landing form, favicon and health check.

use super::{
    AppState,
    types::{HealthResponse, LandingQuery},
};
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{Html, IntoResponse},
};

/// Inline site icon, reachable before a visitor holds a credential.
pub const FAVICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32"><rect width="32" height="32" rx="6" fill="#1f2937"/><path d="M10 24V8h7a4 4 0 0 1 0 8h-7h8a4 4 0 0 1 0 8z" fill="none" stroke="#f9fafb" stroke-width="2.5"/></svg>"##;

// =============================================================================
// LANDING PAGE
// =============================================================================

/// Render the access-request form.
pub async fn landing_handler(
    State(state): State<AppState>,
    Query(query): Query<LandingQuery>,
) -> impl IntoResponse {
    let issuance_open = state.config.password.is_some();
    let failed = query.error.as_deref() == Some("invalid");
    Html(render_landing(
        &state.config.gate.issuance_path,
        issuance_open,
        failed,
    ))
}

fn render_landing(action: &str, issuance_open: bool, failed: bool) -> String {
    let body = if issuance_open {
        let error = if failed {
            r#"<p class="error" role="alert">That password didn't work. Try again.</p>"#
        } else {
            ""
        };
        format!(
            r#"{error}
    <form method="post" action="{action}">
      <label for="password">Beta password</label>
      <input id="password" name="password" type="password" autocomplete="current-password" required autofocus>
      <button type="submit">Enter</button>
    </form>"#,
            error = error,
            action = escape_html(action),
        )
    } else {
        "<p>Access requests are currently closed.</p>".to_string()
    };

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="robots" content="noindex">
  <link rel="icon" type="image/svg+xml" href="/favicon.svg">
  <title>Private beta</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 24rem; margin: 15vh auto; padding: 0 1rem; }}
    .error {{ color: #b91c1c; }}
    input, button {{ display: block; width: 100%; margin-top: .5rem; padding: .5rem; }}
  </style>
</head>
<body>
  <main>
    <h1>Private beta</h1>
    <p>This site is in private beta. Enter the beta password to continue.</p>
    {body}
  </main>
</body>
</html>
"#,
        body = body,
    )
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// =============================================================================
// FAVICON
// =============================================================================

pub async fn favicon_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        FAVICON_SVG,
    )
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::ok(state.config.gate.enabled))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_shows_form_and_error() {
        let html = render_landing("/api/beta-auth", true, true);
        assert!(html.contains(r#"action="/api/beta-auth""#));
        assert!(html.contains("didn't work"));
    }

    #[test]
    fn test_landing_closed_without_password() {
        let html = render_landing("/api/beta-auth", false, false);
        assert!(!html.contains("<form"));
        assert!(html.contains("closed"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"/a"><script>"#), "/a&quot;&gt;&lt;script&gt;");
    }
}
