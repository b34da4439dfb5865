//! # Configuration Loading
//!
//! Resolves the process-wide configuration once at startup.
//!
//! ## Layering (lowest to highest precedence)
//!
//! 1. Built-in defaults
//! 2. TOML file passed with `--config`
//! 3. Environment variables
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `BETA_GATE_ENABLED` | Feature flag (default: true) |
//! | `BETA_GATE_SECRET` | Credential signing secret (default: insecure fallback) |
//! | `BETA_GATE_PASSWORD` | Shared beta password; unset disables issuance |
//! | `BETA_GATE_ENV` | `development`, `staging` or `production` |
//! | `BETA_GATE_PUBLIC_PATHS` | Comma-separated extra public prefixes |
//! | `BETA_GATE_SECURE_COOKIE` | Add `Secure` to the credential cookie |
//! | `BETA_GATE_TOKEN_TTL` | Credential lifetime in seconds |
//! | `BETA_GATE_RATE_LIMIT` | Issuance attempts per second (0 disables) |

use beta_gate_core::{
    CookieSettings, DEFAULT_COOKIE_NAME, DEFAULT_ISSUANCE_PATH, DEFAULT_LANDING_PATH,
    DEFAULT_TOKEN_TTL_SECS, Environment, GateConfig, GateError, PublicPaths, SharedSecret,
};
use serde::Deserialize;
use std::path::Path;

pub const ENV_ENABLED: &str = "BETA_GATE_ENABLED";
pub const ENV_SECRET: &str = "BETA_GATE_SECRET";
pub const ENV_PASSWORD: &str = "BETA_GATE_PASSWORD";
pub const ENV_ENVIRONMENT: &str = "BETA_GATE_ENV";
pub const ENV_PUBLIC_PATHS: &str = "BETA_GATE_PUBLIC_PATHS";
pub const ENV_SECURE_COOKIE: &str = "BETA_GATE_SECURE_COOKIE";
pub const ENV_TOKEN_TTL: &str = "BETA_GATE_TOKEN_TTL";
pub const ENV_RATE_LIMIT: &str = "BETA_GATE_RATE_LIMIT";

/// Default issuance rate limit: 10 attempts per second.
pub const DEFAULT_RATE_LIMIT: u32 = 10;

// =============================================================================
// FILE FORMAT
// =============================================================================

/// On-disk TOML configuration. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub enabled: Option<bool>,
    pub secret: Option<String>,
    pub password: Option<String>,
    pub environment: Option<Environment>,
    pub public_paths: Option<Vec<String>>,
    pub landing_path: Option<String>,
    pub issuance_path: Option<String>,
    pub cookie_name: Option<String>,
    pub secure_cookie: Option<bool>,
    pub token_ttl_secs: Option<u64>,
    pub rate_limit: Option<u32>,
}

impl FileConfig {
    /// Read and parse a TOML configuration file.
    pub fn from_path(path: &Path) -> Result<Self, GateError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            GateError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&text)
            .map_err(|e| GateError::Config(format!("{} ({})", e, path.display())))
    }

    pub fn from_toml(text: &str) -> Result<Self, GateError> {
        toml::from_str(text).map_err(|e| GateError::Config(format!("Invalid TOML: {}", e)))
    }
}

// =============================================================================
// RESOLVED CONFIGURATION
// =============================================================================

/// Everything the server needs, resolved and validated.
#[derive(Debug)]
pub struct AppConfig {
    pub gate: GateConfig,
    /// Shared beta password. `None` disables credential issuance.
    pub password: Option<SharedSecret>,
    /// Issuance attempts per second; 0 disables rate limiting.
    pub rate_limit: u32,
}

impl AppConfig {
    /// Load from an optional file plus the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, GateError> {
        let file = match path {
            Some(p) => FileConfig::from_path(p)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup and validate the result.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self, GateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let enabled = match env(ENV_ENABLED) {
            Some(v) => parse_bool(ENV_ENABLED, &v)?,
            None => file.enabled.unwrap_or(true),
        };

        let environment = match env(ENV_ENVIRONMENT) {
            Some(v) => v.parse()?,
            None => file.environment.unwrap_or_default(),
        };

        let secret = env(ENV_SECRET)
            .or(file.secret)
            .map(SharedSecret::new)
            .unwrap_or_else(SharedSecret::fallback);

        let password = env(ENV_PASSWORD)
            .or(file.password)
            .filter(|p| !p.is_empty())
            .map(SharedSecret::new);

        let landing_path = file
            .landing_path
            .unwrap_or_else(|| DEFAULT_LANDING_PATH.to_string());
        let issuance_path = file
            .issuance_path
            .unwrap_or_else(|| DEFAULT_ISSUANCE_PATH.to_string());

        let mut public_paths = match file.public_paths {
            Some(paths) => PublicPaths::new(paths),
            None => PublicPaths::default(),
        };
        if let Some(extra) = env(ENV_PUBLIC_PATHS) {
            for prefix in extra.split(',') {
                public_paths.ensure(prefix);
            }
        }
        // Without these two nobody could ever obtain a credential.
        for required in [&issuance_path, &landing_path] {
            if public_paths.ensure(required.as_str()) {
                tracing::debug!(path = %required, "Added required path to public set");
            }
        }

        let secure = match env(ENV_SECURE_COOKIE) {
            Some(v) => parse_bool(ENV_SECURE_COOKIE, &v)?,
            None => file.secure_cookie.unwrap_or(false),
        };

        let max_age_secs = match env(ENV_TOKEN_TTL) {
            Some(v) => parse_number(ENV_TOKEN_TTL, &v)?,
            None => file.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        };
        if max_age_secs == 0 {
            return Err(GateError::Config(
                "token_ttl_secs must be greater than zero".to_string(),
            ));
        }

        let rate_limit = match env(ENV_RATE_LIMIT) {
            Some(v) => parse_number(ENV_RATE_LIMIT, &v)?,
            None => file.rate_limit.unwrap_or(DEFAULT_RATE_LIMIT),
        };

        let gate = GateConfig {
            enabled,
            public_paths,
            secret,
            landing_path,
            issuance_path,
            cookie: CookieSettings {
                name: file
                    .cookie_name
                    .unwrap_or_else(|| DEFAULT_COOKIE_NAME.to_string()),
                secure,
                max_age_secs,
            },
            environment,
        };
        gate.validate()?;

        Ok(Self {
            gate,
            password,
            rate_limit,
        })
    }

    /// Configuration hazards worth a startup warning.
    pub fn hazards(&self) -> Vec<String> {
        let mut hazards = self.gate.hazards();
        if self.gate.enabled && self.password.is_none() {
            hazards.push(format!(
                "{} is not set; issuance is disabled and only pre-issued credentials work",
                ENV_PASSWORD
            ));
        }
        hazards
    }

    /// Log every hazard at WARN.
    pub fn log_hazards(&self) {
        for hazard in self.hazards() {
            tracing::warn!(event = "config_hazard", "{}", hazard);
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, GateError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GateError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, GateError> {
    value.trim().parse().map_err(|_| {
        GateError::Config(format!(
            "{} must be a non-negative integer, got '{}'",
            key, value
        ))
    })
}

// =============================================================================
// TESTS
// =============================================================================
