//! # CLI Command Implementations

use crate::{
    api::{self, unix_now},
    config::AppConfig,
};
use beta_gate_core::{CredentialVerifier, GateError, JwtCredentials};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Output preferences shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    fn print_json(&self, value: &serde_json::Value) -> Result<(), GateError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| GateError::Io(format!("Cannot render JSON: {}", e)))?;
        println!("{}", text);
        Ok(())
    }
}

/// Validate the site directory before serving it.
fn validate_site_dir(path: &Path) -> Result<PathBuf, GateError> {
    let canonical = path.canonicalize().map_err(|e| {
        GateError::Io(format!("Invalid site directory '{}': {}", path.display(), e))
    })?;

    if !canonical.is_dir() {
        return Err(GateError::Io(format!(
            "Site path '{}' is not a directory",
            path.display()
        )));
    }

    Ok(canonical)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(
    config: AppConfig,
    host: &str,
    port: u16,
    site_dir: &Path,
    output: Output,
) -> Result<(), GateError> {
    let site_dir = validate_site_dir(site_dir)?;

    if !output.quiet {
        println!("Beta Gate Server Starting...");
        println!();
        println!("Configuration:");
        println!("  Host:        {}", host);
        println!("  Port:        {}", port);
        println!("  Site:        {}", site_dir.display());
        println!("  Gate:        {}", enabled_label(config.gate.enabled));
        println!("  Environment: {}", config.gate.environment);
        println!("  Issuance:    {}", enabled_label(config.password.is_some()));
        println!();
    }

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, config, &site_dir).await
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}

// =============================================================================
// ISSUE COMMAND
// =============================================================================

/// Mint a credential with the configured secret and print it.
pub fn cmd_issue(config: &AppConfig, ttl: Option<u64>, output: Output) -> Result<(), GateError> {
    let ttl = ttl.unwrap_or(config.gate.cookie.max_age_secs);
    if ttl == 0 {
        return Err(GateError::Config("ttl must be greater than zero".to_string()));
    }

    config.log_hazards();

    let now = unix_now()?;
    let token = JwtCredentials::new().issue(&config.gate.secret, now, ttl)?;
    let expires_at = now.saturating_add(ttl);

    if output.json {
        output.print_json(&json!({
            "cookie_name": config.gate.cookie.name,
            "token": token,
            "issued_at": now,
            "expires_at": expires_at,
        }))
    } else {
        if !output.quiet {
            eprintln!(
                "Credential valid for {}s (expires at {}). Set it as cookie {}:",
                ttl, expires_at, config.gate.cookie.name
            );
        }
        println!("{}", token);
        Ok(())
    }
}

// =============================================================================
// VERIFY COMMAND
// =============================================================================

/// Verify a credential with the configured secret.
pub fn cmd_verify(config: &AppConfig, token: &str, output: Output) -> Result<(), GateError> {
    let result = JwtCredentials::new().verify(token.trim(), &config.gate.secret);

    match (&result, output.json) {
        (Ok(claims), true) => output.print_json(&json!({
            "valid": true,
            "subject": claims.sub,
            "issued_at": claims.iat,
            "expires_at": claims.exp,
        }))?,
        (Err(e), true) => output.print_json(&json!({
            "valid": false,
            "reason": e.to_string(),
        }))?,
        (Ok(claims), false) => {
            println!("Credential valid");
            println!("  Subject:    {}", claims.sub);
            println!("  Issued at:  {}", claims.iat);
            println!("  Expires at: {}", claims.exp);
        }
        (Err(_), false) => {}
    }

    result.map(|_| ())
}

// =============================================================================
// CHECK-CONFIG COMMAND
// =============================================================================

/// Print the resolved configuration with the secret redacted.
pub fn cmd_check_config(config: &AppConfig, output: Output) -> Result<(), GateError> {
    let gate = &config.gate;
    let hazards = config.hazards();

    if output.json {
        return output.print_json(&json!({
            "enabled": gate.enabled,
            "environment": gate.environment.as_str(),
            "public_paths": gate.public_paths.iter().collect::<Vec<_>>(),
            "landing_path": gate.landing_path,
            "issuance_path": gate.issuance_path,
            "cookie_name": gate.cookie.name,
            "secure_cookie": gate.cookie.secure,
            "token_ttl_secs": gate.cookie.max_age_secs,
            "secret": gate.secret.to_string(),
            "default_secret": gate.secret.is_default(),
            "issuance_enabled": config.password.is_some(),
            "rate_limit": config.rate_limit,
            "hazards": hazards,
        }));
    }

    println!("Beta Gate Configuration");
    println!("=======================");
    println!("Gate:           {}", enabled_label(gate.enabled));
    println!("Environment:    {}", gate.environment);
    println!("Landing page:   {}", gate.landing_path);
    println!(
        "Issuance:       {} ({})",
        gate.issuance_path,
        enabled_label(config.password.is_some())
    );
    println!("Public paths:");
    for prefix in gate.public_paths.iter() {
        println!("  - {}", prefix);
    }
    println!(
        "Cookie:         {} (secure: {}, max-age: {}s)",
        gate.cookie.name, gate.cookie.secure, gate.cookie.max_age_secs
    );
    println!("Secret:         {}", gate.secret);
    println!("Rate limit:     {}/s", config.rate_limit);

    if !hazards.is_empty() {
        println!();
        println!("Hazards:");
        for hazard in &hazards {
            println!("  ! {}", hazard);
        }
    }

    Ok(())
}
