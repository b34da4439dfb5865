//! # Gate Scenarios
//!
//! End-to-end decisions with the real JWT verifier.

#![allow(clippy::unwrap_used, clippy::panic)]

use beta_gate_core::{
    ForwardReason, GateConfig, GateDecision, JwtCredentials, RedirectReason, SharedSecret, decide,
};
use std::time::{SystemTime, UNIX_EPOCH};

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn config_with_secret(secret: &str) -> GateConfig {
    GateConfig {
        secret: SharedSecret::new(secret),
        ..GateConfig::default()
    }
}

#[test]
fn gated_page_without_cookie_goes_to_landing() {
    let config = config_with_secret("scenario-secret");
    let decision = decide(&config, &JwtCredentials::new(), "/gear.html", None);
    assert_eq!(
        decision,
        GateDecision::Redirect {
            location: "/beta-gate".into(),
            clear_cookie: None,
            reason: RedirectReason::MissingCredential,
        }
    );
}

#[test]
fn issuance_endpoint_is_reachable_without_cookie() {
    let config = config_with_secret("scenario-secret");
    let decision = decide(&config, &JwtCredentials::new(), "/api/beta-auth", None);
    assert_eq!(decision, GateDecision::Forward(ForwardReason::PublicPath));
}

#[test]
fn signed_unexpired_cookie_forwards() {
    let config = config_with_secret("scenario-secret");
    let jwt = JwtCredentials::new();
    let token = jwt.issue(&config.secret, now(), 3600).unwrap();

    let decision = decide(&config, &jwt, "/dashboard.html", Some(&token));
    assert_eq!(decision, GateDecision::Forward(ForwardReason::ValidCredential));
}

#[test]
fn cookie_signed_with_wrong_secret_is_cleared() {
    let config = config_with_secret("scenario-secret");
    let jwt = JwtCredentials::new();
    let token = jwt
        .issue(&SharedSecret::new("some-other-secret"), now(), 3600)
        .unwrap();

    let decision = decide(&config, &jwt, "/dashboard.html", Some(&token));
    match decision {
        GateDecision::Redirect {
            location,
            clear_cookie,
            reason: RedirectReason::InvalidCredential { detail },
        } => {
            assert_eq!(location, "/beta-gate");
            assert_eq!(clear_cookie.as_deref(), Some("BETA_ACCESS_TOKEN"));
            assert_eq!(detail, "bad signature");
        }
        other => panic!("expected invalid-credential redirect, got {:?}", other),
    }
}

#[test]
fn expired_cookie_is_cleared() {
    let config = config_with_secret("scenario-secret");
    let jwt = JwtCredentials::new();
    let token = jwt.issue(&config.secret, now() - 10_000, 60).unwrap();

    let decision = decide(&config, &jwt, "/dashboard.html", Some(&token));
    assert_eq!(decision.reason(), "invalid_credential");
}

#[test]
fn disabled_gate_forwards_admin_page() {
    let config = GateConfig {
        enabled: false,
        ..config_with_secret("scenario-secret")
    };
    let decision = decide(&config, &JwtCredentials::new(), "/admin.html", None);
    assert_eq!(decision, GateDecision::Forward(ForwardReason::Disabled));
}
