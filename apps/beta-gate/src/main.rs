//! # Beta Gate - Private Beta Access Gate
//!
//! The main binary for Beta Gate.
//!
//! This application provides:
//! - HTTP server: the gate in front of a static site (axum)
//! - CLI interface for issuing and checking credentials
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                   apps/beta-gate (THE BINARY)                  │
//! │                                                                │
//! │  ┌─────────────┐    ┌──────────────────────────────────────┐   │
//! │  │   CLI       │    │  HTTP: trace → gate → routes / site   │   │
//! │  │  (clap)     │    │  (axum + tower-http)                  │   │
//! │  └──────┬──────┘    └──────────────────┬───────────────────┘   │
//! │         │                              │                       │
//! │         └──────────────┬───────────────┘                       │
//! │                        ▼                                       │
//! │                ┌────────────────┐                              │
//! │                │ beta-gate-core │                              │
//! │                │ (THE DECISION) │                              │
//! │                └────────────────┘                              │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serve ./site behind the gate
//! BETA_GATE_PASSWORD=letmein BETA_GATE_SECRET=... beta-gate server --site-dir ./site
//!
//! # Mint a credential out of band
//! beta-gate issue --ttl 3600
//!
//! # Inspect the resolved configuration
//! beta-gate --config gate.toml check-config
//! ```

use beta_gate::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // BETA_GATE_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("BETA_GATE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "beta_gate=info,beta_gate_core=info,tower_http=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(kind = e.kind(), "Error: {}", e);
        std::process::exit(1);
    }
}
