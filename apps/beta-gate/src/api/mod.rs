//! # Beta Gate HTTP Module
//!
//! This module hosts the gate in front of the downstream application using axum.
//!
//! ## Endpoints
//!
//! - `GET /beta-gate` - Landing page with the access-request form (public)
//! - `POST /api/beta-auth` - Credential issuance for the beta password (public)
//! - `GET /favicon.svg` - Site icon (public)
//! - `GET /health` - Health check (gated like every other non-public path)
//! - everything else - the downstream application, reached only through the gate
//!
//! ## Middleware stack (outer to inner)
//!
//! 1. Tracing - logs all requests
//! 2. Body limit
//! 3. Gate - forward or redirect, on every route and on the fallback
//! 4. Rate limiting - issuance endpoint only

mod auth;
mod gate;
mod handlers;
mod middleware;
mod types;

pub use auth::{constant_time_eq, issue_handler, unix_now};
pub use gate::gate_middleware;
pub use handlers::{FAVICON_SVG, favicon_handler, health_handler, landing_handler};
pub use middleware::{GlobalRateLimiter, create_rate_limiter, rate_limit_middleware};
pub use types::{BetaAuthForm, HealthResponse, LandingQuery};

use crate::config::AppConfig;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use beta_gate_core::{
    CredentialVerifier, DEFAULT_FAVICON_PATH, GateError, HEALTH_PATH, JwtCredentials,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Form posts to the issuance endpoint are tiny.
const MAX_BODY_BYTES: usize = 16 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared, read-only server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Checks credentials for the gate.
    pub verifier: Arc<dyn CredentialVerifier>,
    /// Mints credentials for the issuance endpoint.
    pub credentials: Arc<JwtCredentials>,
}

impl AppState {
    /// State using the JWT implementation for both issuing and verifying.
    pub fn new(config: AppConfig) -> Self {
        let credentials = Arc::new(JwtCredentials::new());
        Self {
            config: Arc::new(config),
            verifier: credentials.clone(),
            credentials,
        }
    }

    /// State with a substitute verifier, e.g. a fake in tests.
    pub fn with_verifier(config: AppConfig, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self {
            config: Arc::new(config),
            verifier,
            credentials: Arc::new(JwtCredentials::new()),
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// The downstream application: static files served from `site_dir`.
pub fn static_site(site_dir: &Path) -> Router {
    Router::new().fallback_service(ServeDir::new(site_dir))
}

/// Create the router: gate routes, the downstream application as fallback,
/// and the gate middleware wrapped around both.
pub fn create_router(state: AppState, downstream: Router) -> Router {
    let gate = &state.config.gate;

    let mut issue = post(auth::issue_handler);
    if state.config.rate_limit > 0 {
        tracing::info!(
            "Issuance rate limiting enabled: {} attempts/second",
            state.config.rate_limit
        );
        let limiter = create_rate_limiter(state.config.rate_limit);
        issue = issue.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    } else {
        tracing::info!("Issuance rate limiting disabled");
    }

    if gate.enabled {
        tracing::info!(
            public_paths = ?gate.public_paths.iter().collect::<Vec<_>>(),
            landing = %gate.landing_path,
            "Beta gate enabled"
        );
    } else {
        tracing::warn!("Beta gate DISABLED - every path is publicly accessible");
    }

    Router::new()
        .route(&gate.landing_path, get(handlers::landing_handler))
        .route(&gate.issuance_path, issue)
        .route(DEFAULT_FAVICON_PATH, get(handlers::favicon_handler))
        .route(HEALTH_PATH, get(handlers::health_handler))
        .fallback_service(downstream)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
                .layer(axum_middleware::from_fn_with_state(
                    state.clone(),
                    gate::gate_middleware,
                )),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl-C.
pub async fn run_server(addr: &str, config: AppConfig, site_dir: &Path) -> Result<(), GateError> {
    config.log_hazards();

    let state = AppState::new(config);
    let router = create_router(state, static_site(site_dir));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GateError::Io(format!("Bind failed: {}", e)))?;

    tracing::info!("Beta gate listening on {} (site: {})", addr, site_dir.display());

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| GateError::Io(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
