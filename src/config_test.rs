use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn api_config_defaults() {
    let cfg = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.request_timeout, None);
    assert_eq!(cfg.connect_timeout, None);
}

#[test]
fn api_config_overrides_and_trims_slash() {
    let cfg = ApiConfig::from_lookup(lookup_from(&[
        ("DASHBOARD_API_BASE_URL", "https://api.example.test/"),
        ("DASHBOARD_REQUEST_TIMEOUT_SECS", "30"),
        ("DASHBOARD_CONNECT_TIMEOUT_SECS", " 5 "),
    ]))
    .unwrap();
    assert_eq!(cfg.base_url, "https://api.example.test");
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(30)));
    assert_eq!(cfg.connect_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn api_config_rejects_non_http_url() {
    let err = ApiConfig::from_lookup(lookup_from(&[("DASHBOARD_API_BASE_URL", "ftp://files")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));
}

#[test]
fn api_config_rejects_bad_timeout() {
    let err = ApiConfig::from_lookup(lookup_from(&[("DASHBOARD_REQUEST_TIMEOUT_SECS", "soon")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidNumber { var: "DASHBOARD_REQUEST_TIMEOUT_SECS", value: "soon".into() });
}

#[test]
fn empty_timeout_is_unset() {
    let cfg = ApiConfig::from_lookup(lookup_from(&[("DASHBOARD_REQUEST_TIMEOUT_SECS", "")])).unwrap();
    assert_eq!(cfg.request_timeout, None);
}

#[test]
fn cache_config_defaults_match_default_impl() {
    let cfg = CacheConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, CacheConfig::default());
}

#[test]
fn cache_config_overrides() {
    let cfg = CacheConfig::from_lookup(lookup_from(&[
        ("DASHBOARD_CACHE_GC_SECS", "900"),
        ("DASHBOARD_CACHE_GC_INTERVAL_SECS", "15"),
    ]))
    .unwrap();
    assert_eq!(cfg.gc_time, Duration::from_secs(900));
    assert_eq!(cfg.gc_interval, Duration::from_secs(15));
}
