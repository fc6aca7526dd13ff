//! Client configuration parsed from environment variables.
//!
//! Parsing goes through a lookup function so callers (and tests) can supply
//! values without touching the process environment.

use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CACHE_GC_SECS: u64 = 600;
pub const DEFAULT_CACHE_GC_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),
    #[error("invalid value for {var}: {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Backend origin without trailing slash.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves it to the transport.
    pub request_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
}

impl ApiConfig {
    /// Build a config for `base_url` with no timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { base_url: normalize_base_url(base_url)?, request_timeout: None, connect_timeout: None })
    }

    /// Read from the process environment.
    ///
    /// - `DASHBOARD_API_BASE_URL`: default `http://localhost:8080`
    /// - `DASHBOARD_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `DASHBOARD_CONNECT_TIMEOUT_SECS`: unset means no timeout
    ///
    /// # Errors
    ///
    /// Returns an error on a malformed URL or timeout.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read using an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error on a malformed URL or timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("DASHBOARD_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let request_timeout = parse_secs(&lookup, "DASHBOARD_REQUEST_TIMEOUT_SECS")?.map(Duration::from_secs);
        let connect_timeout = parse_secs(&lookup, "DASHBOARD_CONNECT_TIMEOUT_SECS")?.map(Duration::from_secs);
        Ok(Self { base_url: normalize_base_url(&base_url)?, request_timeout, connect_timeout })
    }
}

/// Query cache housekeeping settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Entries not refreshed for this long are dropped by the collector.
    pub gc_time: Duration,
    pub gc_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            gc_time: Duration::from_secs(DEFAULT_CACHE_GC_SECS),
            gc_interval: Duration::from_secs(DEFAULT_CACHE_GC_INTERVAL_SECS),
        }
    }
}

impl CacheConfig {
    /// Read `DASHBOARD_CACHE_GC_SECS` and `DASHBOARD_CACHE_GC_INTERVAL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not a whole number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns an error if either value is not a whole number of seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let gc_secs = parse_secs(&lookup, "DASHBOARD_CACHE_GC_SECS")?.unwrap_or(DEFAULT_CACHE_GC_SECS);
        let interval_secs =
            parse_secs(&lookup, "DASHBOARD_CACHE_GC_INTERVAL_SECS")?.unwrap_or(DEFAULT_CACHE_GC_INTERVAL_SECS);
        Ok(Self { gc_time: Duration::from_secs(gc_secs), gc_interval: Duration::from_secs(interval_secs) })
    }
}

fn parse_secs(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<u64>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
