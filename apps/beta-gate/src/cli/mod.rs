//! # Beta Gate CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Serve a site directory behind the gate
//! - `issue` - Mint a credential with the configured secret
//! - `verify` - Check a credential against the configured secret
//! - `check-config` - Show the resolved configuration and its hazards

mod commands;

use beta_gate_core::GateError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Beta Gate - private beta access gate
///
/// Lets visitors holding a valid signed access cookie through to the site and
/// sends everyone else to the access-request page.
#[derive(Parser, Debug)]
#[command(name = "beta-gate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file (environment variables override it)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Directory holding the site served behind the gate
        #[arg(short, long, default_value = "site")]
        site_dir: PathBuf,
    },

    /// Mint an access credential
    Issue {
        /// Lifetime in seconds (default: configured token TTL)
        #[arg(short, long)]
        ttl: Option<u64>,
    },

    /// Verify an access credential
    Verify {
        /// The token (cookie value)
        token: String,
    },

    /// Show resolved configuration and hazards
    CheckConfig,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), GateError> {
    let config = crate::config::AppConfig::load(cli.config.as_deref())?;
    let output = Output {
        json: cli.json_mode,
        quiet: cli.quiet,
    };

    match cli.command {
        Some(Commands::Server {
            host,
            port,
            site_dir,
        }) => cmd_server(config, &host, port, &site_dir, output).await,
        Some(Commands::Issue { ttl }) => cmd_issue(&config, ttl, output),
        Some(Commands::Verify { token }) => cmd_verify(&config, &token, output),
        Some(Commands::CheckConfig) | None => cmd_check_config(&config, output),
    }
}
