//! # Gate Configuration
//!
//! Process-wide, immutable configuration for the gate decision.
//!
//! Built once at startup by the application (file + environment layering
//! lives in the app crate) and passed into [`decide`](crate::decide) by
//! reference. Nothing in this module reads the process environment.

use crate::{cookie::CookieSettings, error::GateError, secret::SharedSecret};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// NAMED CONSTANTS
// =============================================================================

/// Endpoint that mints credentials for the beta password.
pub const DEFAULT_ISSUANCE_PATH: &str = "/api/beta-auth";

/// Page that renders the access-request form.
pub const DEFAULT_LANDING_PATH: &str = "/beta-gate";

/// Static asset the landing page needs before the visitor holds a credential.
pub const DEFAULT_FAVICON_PATH: &str = "/favicon.svg";

/// Health check route served by the application alongside the gate.
pub const HEALTH_PATH: &str = "/health";

/// Cookie carrying the signed access credential.
pub const DEFAULT_COOKIE_NAME: &str = "BETA_ACCESS_TOKEN";

/// Credential lifetime: 7 days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 7 * 24 * 60 * 60;

// =============================================================================
// DEPLOYMENT ENVIRONMENT
// =============================================================================

/// Deployment environment. Only decides whether the fallback secret is tolerated.
///
/// Parsed through [`FromStr`] from both TOML and the environment, so the
/// same aliases are accepted everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "local" => Ok(Self::Development),
            "staging" | "preview" => Ok(Self::Staging),
            "production" | "prod" => Ok(Self::Production),
            other => Err(GateError::Config(format!("Unknown environment '{}'", other))),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = GateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// =============================================================================
// PUBLIC PATH SET
// =============================================================================

/// Ordered set of path prefixes exempt from gating.
///
/// A request path matches when it starts with any entry, so an entry matches
/// itself and every path that extends it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicPaths(Vec<String>);

impl PublicPaths {
    /// Build a set from prefixes, dropping catch-all entries and duplicates.
    ///
    /// An empty prefix or a bare `/` would exempt every path, so neither
    /// ever enters the set.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self(Vec::new());
        for prefix in prefixes {
            set.ensure(prefix);
        }
        set
    }

    /// Append `prefix` unless it is a catch-all or already present.
    /// Returns whether it was added.
    pub fn ensure(&mut self, prefix: impl Into<String>) -> bool {
        let prefix = prefix.into();
        let prefix = prefix.trim();
        if is_catch_all(prefix) || self.0.iter().any(|p| p == prefix) {
            return false;
        }
        self.0.push(prefix.to_string());
        true
    }

    /// Whether `path` is exempt from gating.
    pub fn matches(&self, path: &str) -> bool {
        self.0.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn is_catch_all(prefix: &str) -> bool {
    prefix.is_empty() || prefix == "/"
}

impl Default for PublicPaths {
    fn default() -> Self {
        Self::new([
            DEFAULT_ISSUANCE_PATH,
            DEFAULT_LANDING_PATH,
            DEFAULT_FAVICON_PATH,
        ])
    }
}

// =============================================================================
// GATE CONFIGURATION
// =============================================================================

/// Everything the gate decision reads.
#[derive(Debug)]
pub struct GateConfig {
    /// Feature flag. When false every request is forwarded.
    pub enabled: bool,
    pub public_paths: PublicPaths,
    pub secret: SharedSecret,
    /// Redirect target for ungated clients.
    pub landing_path: String,
    pub issuance_path: String,
    pub cookie: CookieSettings,
    pub environment: Environment,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            public_paths: PublicPaths::default(),
            secret: SharedSecret::fallback(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
            issuance_path: DEFAULT_ISSUANCE_PATH.to_string(),
            cookie: CookieSettings::default(),
            environment: Environment::default(),
        }
    }
}

impl GateConfig {
    /// Check the invariants that keep the gate from becoming a lockout.
    ///
    /// - landing and issuance paths are absolute, distinct, and both in the public set
    /// - neither is `/`, a fixed route, or route capture syntax
    /// - the cookie name is a valid token
    /// - the secret is non-empty, and not the fallback in production
    pub fn validate(&self) -> Result<(), GateError> {
        for (label, path) in [
            ("landing_path", &self.landing_path),
            ("issuance_path", &self.issuance_path),
        ] {
            check_route_path(label, path)?;
            if !self.public_paths.matches(path) {
                return Err(GateError::Config(format!(
                    "{} '{}' is not in the public path set; nobody could obtain a credential",
                    label, path
                )));
            }
        }

        if self.landing_path == self.issuance_path {
            return Err(GateError::Config(
                "landing_path and issuance_path must differ".to_string(),
            ));
        }

        self.cookie.validate()?;

        if self.secret.is_empty() {
            return Err(GateError::Config("shared secret is empty".to_string()));
        }

        if self.secret.is_default() && self.environment == Environment::Production {
            return Err(GateError::InsecureSecret(self.environment.to_string()));
        }

        Ok(())
    }

    /// Human-readable configuration hazards that do not stop startup.
    pub fn hazards(&self) -> Vec<String> {
        let mut hazards = Vec::new();
        if self.secret.is_default() {
            hazards.push(format!(
                "Using the well-known default shared secret in a {} environment; \
                 anyone can mint credentials",
                self.environment
            ));
        }
        if !self.enabled {
            hazards.push("Gate is DISABLED; every path is publicly reachable".to_string());
        }
        if !self.cookie.secure && self.environment == Environment::Production {
            hazards.push("Credential cookie is sent without the Secure attribute".to_string());
        }
        hazards
    }
}

/// Reject gate route paths the router cannot mount next to its fixed routes.
fn check_route_path(label: &str, path: &str) -> Result<(), GateError> {
    let reason = if !path.starts_with('/') {
        Some("must be an absolute path")
    } else if is_catch_all(path) {
        Some("would make every path public")
    } else if path == DEFAULT_FAVICON_PATH || path == HEALTH_PATH {
        Some("collides with a built-in route")
    } else if path
        .bytes()
        .any(|b| !b.is_ascii_graphic() || b"{}?#".contains(&b))
    {
        Some("must be a plain path without spaces, query, fragment or `{}`")
    } else if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        Some("must not contain `:` or `*` route segments")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(GateError::Config(format!(
            "{} '{}' {}",
            label, path, reason
        ))),
        None => Ok(()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
