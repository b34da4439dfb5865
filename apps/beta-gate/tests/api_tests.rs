//! Integration tests for the Beta Gate HTTP surface.
//!
//! Uses axum-test to drive the full router (gate middleware, issuance
//! endpoint, landing page and a downstream application) without starting a
//! real server. Configuration is resolved from an in-memory environment map,
//! so no test touches the process environment.

#![allow(clippy::unwrap_used, clippy::panic)]

use axum::{
    Router,
    http::{HeaderValue, StatusCode, header},
    routing::get,
};
use axum_test::{TestResponse, TestServer};
use beta_gate::{
    api::{AppState, BetaAuthForm, HealthResponse, create_router, static_site},
    config::{AppConfig, FileConfig},
};
use beta_gate_core::{AccessClaims, CredentialVerifier, GateError, JwtCredentials, SharedSecret};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SECRET: &str = "integration-test-secret";
const PASSWORD: &str = "open sesame";

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn config_with(pairs: &[(&str, &str)]) -> AppConfig {
    let mut env: HashMap<String, String> = HashMap::from([
        ("BETA_GATE_SECRET".to_string(), SECRET.to_string()),
        ("BETA_GATE_PASSWORD".to_string(), PASSWORD.to_string()),
    ]);
    for (k, v) in pairs {
        env.insert(k.to_string(), v.to_string());
    }
    AppConfig::resolve(FileConfig::default(), move |key| env.get(key).cloned()).unwrap()
}

/// Stand-in for the protected application.
fn downstream() -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/gear.html", get(|| async { "gear hire" }))
        .route("/dashboard.html", get(|| async { "dashboard" }))
        .route("/admin.html", get(|| async { "admin" }))
}

fn server_with(config: AppConfig) -> TestServer {
    TestServer::new(create_router(AppState::new(config), downstream())).unwrap()
}

fn create_test_server() -> TestServer {
    server_with(config_with(&[]))
}

fn valid_token() -> String {
    JwtCredentials::new()
        .issue(&SharedSecret::new(SECRET), now(), 3600)
        .unwrap()
}

fn cookie_header(token: &str) -> HeaderValue {
    format!("theme=dark; BETA_ACCESS_TOKEN={}", token)
        .parse()
        .unwrap()
}

fn location(response: &TestResponse) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn set_cookies(response: &TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// GATE SCENARIOS
// =============================================================================

#[tokio::test]
async fn test_gated_page_without_cookie_redirects() {
    let server = create_test_server();

    let response = server.get("/gear.html").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/beta-gate"));
    assert!(set_cookies(&response).is_empty(), "nothing to clear");
}

#[tokio::test]
async fn test_issuance_endpoint_is_public() {
    let server = create_test_server();

    // Reaches the handler (wrong password) instead of the gate redirect.
    let response = server
        .post("/api/beta-auth")
        .form(&BetaAuthForm {
            password: "nope".into(),
        })
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response).as_deref(),
        Some("/beta-gate?error=invalid")
    );
}

#[tokio::test]
async fn test_valid_cookie_forwards() {
    let server = create_test_server();

    let response = server
        .get("/dashboard.html")
        .add_header(header::COOKIE, cookie_header(&valid_token()))
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "dashboard");
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_wrong_secret_cookie_redirects_and_clears() {
    let server = create_test_server();
    let forged = JwtCredentials::new()
        .issue(&SharedSecret::new("not-the-secret"), now(), 3600)
        .unwrap();

    let response = server
        .get("/dashboard.html")
        .add_header(header::COOKIE, cookie_header(&forged))
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/beta-gate"));
    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].starts_with("BETA_ACCESS_TOKEN=;"));
    assert!(cookies[0].contains("Max-Age=0"));
}

#[tokio::test]
async fn test_expired_cookie_redirects_and_clears() {
    let server = create_test_server();
    let expired = JwtCredentials::new()
        .issue(&SharedSecret::new(SECRET), now() - 7200, 60)
        .unwrap();

    let response = server
        .get("/gear.html")
        .add_header(header::COOKIE, cookie_header(&expired))
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn test_malformed_cookie_redirects_and_clears() {
    let server = create_test_server();

    let response = server
        .get("/gear.html")
        .add_header(header::COOKIE, cookie_header("garbage"))
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn test_non_ascii_sibling_cookie_does_not_hide_credential() {
    let server = create_test_server();
    let mut raw = b"name=Jos\xe9; BETA_ACCESS_TOKEN=".to_vec();
    raw.extend_from_slice(valid_token().as_bytes());

    let response = server
        .get("/gear.html")
        .add_header(header::COOKIE, HeaderValue::from_bytes(&raw).unwrap())
        .await;

    response.assert_status_ok();
    assert_eq!(response.text(), "gear hire");
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_non_utf8_credential_redirects_and_clears() {
    let server = create_test_server();

    let response = server
        .get("/gear.html")
        .add_header(
            header::COOKIE,
            HeaderValue::from_bytes(b"theme=dark; BETA_ACCESS_TOKEN=\xe9t\xe9").unwrap(),
        )
        .await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/beta-gate"));
    assert_eq!(set_cookies(&response).len(), 1);
}

#[tokio::test]
async fn test_root_public_prefix_does_not_open_the_gate() {
    let server = server_with(config_with(&[("BETA_GATE_PUBLIC_PATHS", "/")]));

    let response = server.get("/gear.html").await;

    response.assert_status(StatusCode::FOUND);
    assert_eq!(location(&response).as_deref(), Some("/beta-gate"));
}

#[tokio::test]
async fn test_disabled_gate_forwards() {
    let server = server_with(config_with(&[("BETA_GATE_ENABLED", "false")]));

    let response = server.get("/admin.html").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "admin");
}

#[tokio::test]
async fn test_unknown_path_is_gated_before_404() {
    let server = create_test_server();

    let response = server.get("/does-not-exist").await;

    response.assert_status(StatusCode::FOUND);
}

#[tokio::test]
async fn test_health_is_gated() {
    let server = create_test_server();

    server.get("/health").await.assert_status(StatusCode::FOUND);

    let response = server
        .get("/health")
        .add_header(header::COOKIE, cookie_header(&valid_token()))
        .await;
    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert!(health.gate_enabled);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// FAIL-CLOSED WITH A BROKEN VERIFIER
// =============================================================================

struct PanickingVerifier;

impl CredentialVerifier for PanickingVerifier {
    fn verify(&self, _: &str, _: &SharedSecret) -> Result<AccessClaims, GateError> {
        panic!("verifier blew up")
    }
}

struct FailingVerifier;

impl CredentialVerifier for FailingVerifier {
    fn verify(&self, _: &str, _: &SharedSecret) -> Result<AccessClaims, GateError> {
        Err(GateError::Verifier("backend unavailable".into()))
    }
}

#[tokio::test]
async fn test_verifier_failures_fail_closed() {
    let verifiers: [Arc<dyn CredentialVerifier>; 2] =
        [Arc::new(PanickingVerifier), Arc::new(FailingVerifier)];

    for verifier in verifiers {
        let state = AppState::with_verifier(config_with(&[]), verifier);
        let server = TestServer::new(create_router(state, downstream())).unwrap();

        let response = server
            .get("/dashboard.html")
            .add_header(header::COOKIE, cookie_header(&valid_token()))
            .await;

        response.assert_status(StatusCode::FOUND);
        assert_eq!(location(&response).as_deref(), Some("/beta-gate"));
        assert_eq!(set_cookies(&response).len(), 1);
    }
}

// =============================================================================
// ISSUANCE
// =============================================================================

#[tokio::test]
async fn test_correct_password_issues_usable_cookie() {
    let server = create_test_server();

    let response = server
        .post("/api/beta-auth")
        .form(&BetaAuthForm {
            password: PASSWORD.into(),
        })
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response).as_deref(), Some("/"));

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].contains("HttpOnly"));
    let token = cookies[0]
        .strip_prefix("BETA_ACCESS_TOKEN=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string();

    let response = server
        .get("/gear.html")
        .add_header(header::COOKIE, cookie_header(&token))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "gear hire");
}

#[tokio::test]
async fn test_wrong_password_sets_no_cookie() {
    let server = create_test_server();

    let response = server
        .post("/api/beta-auth")
        .form(&BetaAuthForm {
            password: "open sesam".into(),
        })
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert!(set_cookies(&response).is_empty());
}

#[tokio::test]
async fn test_issuance_disabled_without_password() {
    let config = AppConfig::resolve(FileConfig::default(), |key| {
        (key == "BETA_GATE_SECRET").then(|| SECRET.to_string())
    })
    .unwrap();
    let server = server_with(config);

    let response = server
        .post("/api/beta-auth")
        .form(&BetaAuthForm {
            password: "anything".into(),
        })
        .await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_issuance_rate_limited() {
    let server = server_with(config_with(&[("BETA_GATE_RATE_LIMIT", "1")]));
    let form = BetaAuthForm {
        password: "guess".into(),
    };

    server
        .post("/api/beta-auth")
        .form(&form)
        .await
        .assert_status(StatusCode::SEE_OTHER);
    server
        .post("/api/beta-auth")
        .form(&form)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_secure_cookie_attribute() {
    let server = server_with(config_with(&[("BETA_GATE_SECURE_COOKIE", "true")]));

    let response = server
        .post("/api/beta-auth")
        .form(&BetaAuthForm {
            password: PASSWORD.into(),
        })
        .await;

    let cookies = set_cookies(&response);
    assert_eq!(cookies.len(), 1);
    assert!(cookies[0].ends_with("; Secure"));
}

// =============================================================================
// LANDING PAGE & STATIC EXEMPTION
// =============================================================================

#[tokio::test]
async fn test_landing_page_is_public() {
    let server = create_test_server();

    let response = server.get("/beta-gate").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"action="/api/beta-auth""#));
    assert!(!html.contains("didn't work"));
}

#[tokio::test]
async fn test_landing_page_shows_error() {
    let server = create_test_server();

    let response = server.get("/beta-gate?error=invalid").await;

    response.assert_status_ok();
    assert!(response.text().contains("didn't work"));
}

#[tokio::test]
async fn test_favicon_is_public() {
    let server = create_test_server();

    let response = server.get("/favicon.svg").await;

    response.assert_status_ok();
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("image/svg+xml")
    );
}

#[tokio::test]
async fn test_static_site_behind_gate() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>members</h1>").unwrap();
    std::fs::write(dir.path().join("gear.html"), "<h1>gear</h1>").unwrap();

    let router = create_router(AppState::new(config_with(&[])), static_site(dir.path()));
    let server = TestServer::new(router).unwrap();

    server.get("/gear.html").await.assert_status(StatusCode::FOUND);

    let response = server
        .get("/gear.html")
        .add_header(header::COOKIE, cookie_header(&valid_token()))
        .await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<h1>gear</h1>");
}
