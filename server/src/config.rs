//! Server configuration.
//!
//! Read once at startup from the environment (after `.env` is loaded).
//! Parsing takes a lookup function so tests never mutate process state.

use std::path::PathBuf;

use dashboard::config::{ApiConfig, ConfigError};
use dashboard::guard::GuardPolicy;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub api: ApiConfig,
    /// Mark session cookies `Secure`.
    pub cookie_secure: bool,
    pub guard: GuardPolicy,
    /// Directory the page assets are served from.
    pub website_dir: PathBuf,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns an error if any variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: explicit; otherwise on when `DASHBOARD_PUBLIC_URL`
    ///   is https
    /// - `GUARD_ENFORCE_AUTH`: redirect anonymous protected requests, default
    ///   off
    /// - `WEBSITE_DIR`: default `../website` next to this crate
    /// - plus the backend variables read by [`ApiConfig`]
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT").filter(|raw| !raw.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { var: "PORT", value: raw })?,
            None => DEFAULT_PORT,
        };

        let cookie_secure = lookup("COOKIE_SECURE")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or_else(|| {
                lookup("DASHBOARD_PUBLIC_URL").is_some_and(|url| url.trim().starts_with("https://"))
            });

        let enforce_protected = lookup("GUARD_ENFORCE_AUTH")
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(false);

        let website_dir = lookup("WEBSITE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../website"));

        Ok(Self {
            port,
            api: ApiConfig::from_lookup(&lookup)?,
            cookie_secure,
            guard: GuardPolicy { enforce_protected },
            website_dir,
        })
    }
}

/// Lenient boolean: `1/true/yes/on` and `0/false/no/off`, any case.
pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
