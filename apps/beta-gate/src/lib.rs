//! # beta-gate
//!
//! Server and CLI around [`beta_gate_core`]: configuration loading, the axum
//! router with the gate middleware, the issuance endpoint and landing page.
//!
//! Exposed as a library so the integration tests can build the router
//! directly (via `beta_gate::api::*`).

pub mod api;
pub mod cli;
pub mod config;
