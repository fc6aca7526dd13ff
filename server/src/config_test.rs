use std::collections::HashMap;

use super::*;

fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  yes  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "OFF"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_rejects_other_values() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}

// =============================================================================
// ServerConfig
// =============================================================================

#[test]
fn defaults() {
    let cfg = config(&[]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(!cfg.cookie_secure);
    assert!(!cfg.guard.enforce_protected);
    assert_eq!(cfg.api.base_url, "http://localhost:8080");
    assert!(cfg.website_dir.ends_with("website"));
}

#[test]
fn https_public_url_implies_secure_cookies() {
    assert!(config(&[("DASHBOARD_PUBLIC_URL", "https://admin.food.io")]).unwrap().cookie_secure);
    assert!(!config(&[("DASHBOARD_PUBLIC_URL", "http://localhost:3000")]).unwrap().cookie_secure);
}

#[test]
fn explicit_cookie_secure_wins() {
    let cfg = config(&[("COOKIE_SECURE", "false"), ("DASHBOARD_PUBLIC_URL", "https://admin.food.io")]).unwrap();
    assert!(!cfg.cookie_secure);
}

#[test]
fn unparseable_cookie_secure_falls_back_to_public_url() {
    let cfg = config(&[("COOKIE_SECURE", "sometimes"), ("DASHBOARD_PUBLIC_URL", "https://admin.food.io")]).unwrap();
    assert!(cfg.cookie_secure);
}

#[test]
fn guard_enforcement_flag() {
    assert!(config(&[("GUARD_ENFORCE_AUTH", "1")]).unwrap().guard.enforce_protected);
}

#[test]
fn bad_port_is_rejected() {
    let err = config(&[("PORT", "eighty")]).unwrap_err();
    assert_eq!(err, ConfigError::InvalidNumber { var: "PORT", value: "eighty".into() });
}

#[test]
fn backend_settings_are_forwarded() {
    let cfg = config(&[("DASHBOARD_API_BASE_URL", "https://api.food.io/"), ("WEBSITE_DIR", "/srv/admin")]).unwrap();
    assert_eq!(cfg.api.base_url, "https://api.food.io");
    assert_eq!(cfg.website_dir, PathBuf::from("/srv/admin"));
}
