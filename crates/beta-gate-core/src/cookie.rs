//! # Cookie Helpers
//!
//! Reading the credential out of `Cookie` request headers and rendering the
//! `Set-Cookie` values that store or clear it.

use std::borrow::Cow;

use crate::{
    config::{DEFAULT_COOKIE_NAME, DEFAULT_TOKEN_TTL_SECS},
    error::GateError,
};

// =============================================================================
// COOKIE LOOKUP
// =============================================================================

/// Find the value of cookie `name` across one or more raw `Cookie` header values.
///
/// Each header value is a `;`-separated list of `name=value` pairs. The first
/// match wins. Whitespace around names and values is trimmed and a value
/// wrapped in double quotes is unquoted. Pairs without `=` are skipped.
///
/// Headers are scanned as bytes, so an unrelated cookie holding non-ASCII
/// text never hides the one asked for. A matched value that is not UTF-8 is
/// returned lossily; it can never verify, so it still counts as present.
pub fn find_cookie<'a, I>(header_values: I, name: &str) -> Option<Cow<'a, str>>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    header_values
        .into_iter()
        .flat_map(|header| header.split(|&b| b == b';'))
        .filter_map(|pair| {
            let eq = pair.iter().position(|&b| b == b'=')?;
            Some((&pair[..eq], &pair[eq + 1..]))
        })
        .find(|(key, _)| key.trim_ascii() == name.as_bytes())
        .map(|(_, value)| {
            let value = value.trim_ascii();
            let value = value
                .strip_prefix(b"\"")
                .and_then(|v| v.strip_suffix(b"\""))
                .unwrap_or(value);
            String::from_utf8_lossy(value)
        })
}

// =============================================================================
// SET-COOKIE RENDERING
// =============================================================================

/// Attributes of the credential cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub name: String,
    /// Add the `Secure` attribute (HTTPS-only deployments).
    pub secure: bool,
    /// Lifetime of a freshly issued cookie, matching the credential expiry.
    pub max_age_secs: u64,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: false,
            max_age_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl CookieSettings {
    /// Reject names that would corrupt the `Cookie`/`Set-Cookie` syntax.
    pub fn validate(&self) -> Result<(), GateError> {
        let valid = !self.name.is_empty()
            && self
                .name
                .bytes()
                .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b));
        if valid {
            Ok(())
        } else {
            Err(GateError::Config(format!(
                "Invalid cookie name '{}'",
                self.name
            )))
        }
    }

    /// `Set-Cookie` value storing a freshly issued credential.
    pub fn set_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; Path=/; Max-Age={}; {}",
            self.name,
            token,
            self.max_age_secs,
            self.attributes()
        )
    }

    /// `Set-Cookie` value instructing the client to drop the credential.
    ///
    /// Sending this for a cookie the client does not hold is a no-op.
    pub fn clear_cookie(&self) -> String {
        format!("{}=; Path=/; Max-Age=0; {}", self.name, self.attributes())
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "HttpOnly; SameSite=Lax; Secure"
        } else {
            "HttpOnly; SameSite=Lax"
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
