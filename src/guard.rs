//! Routing guard decision.
//!
//! Runs once per incoming page request. Routes are either public (login-type
//! pages) or protected, by a plain prefix match against [`PUBLIC_ROUTES`].
//!
//! - public, session present: redirect to [`LANDING_ROUTE`]
//! - public, no session: allow
//! - protected: allow, unless [`GuardPolicy::enforce_protected`] is on, in
//!   which case a request without a session goes to [`LOGIN_ROUTE`]
//!
//! Enforcement is off by default. Turning it on changes who can load
//! dashboard pages and needs a product decision first.

pub const PUBLIC_ROUTES: [&str; 4] = ["/login", "/signup", "/forgot-password", "/reset-password"];

/// Requests under these prefixes never reach the guard (API calls, assets).
pub const BYPASS_PREFIXES: [&str; 4] = ["/api/", "/assets/", "/favicon.ico", "/healthz"];

pub const LANDING_ROUTE: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardPolicy {
    /// Redirect unauthenticated protected requests to the login route.
    pub enforce_protected: bool,
}

#[must_use]
pub fn classify(path: &str) -> RouteClass {
    if PUBLIC_ROUTES.iter().any(|route| path.starts_with(route)) {
        RouteClass::Public
    } else {
        RouteClass::Protected
    }
}

#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

#[must_use]
pub fn evaluate(path: &str, has_session: bool, policy: &GuardPolicy) -> GuardDecision {
    if is_bypassed(path) {
        return GuardDecision::Allow;
    }
    match classify(path) {
        RouteClass::Public if has_session => GuardDecision::Redirect(LANDING_ROUTE),
        RouteClass::Public => GuardDecision::Allow,
        RouteClass::Protected if policy.enforce_protected && !has_session => GuardDecision::Redirect(LOGIN_ROUTE),
        RouteClass::Protected => GuardDecision::Allow,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
