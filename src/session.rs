//! Session credential storage.
//!
//! ARCHITECTURE
//! ============
//! The session lives in three cookies. The server writes them as real
//! `Set-Cookie` headers; in-process callers (the CLI, tests) keep them in a
//! [`MemoryCookieStore`]. Both read the cookie names and policies from the
//! [`CookieSpec`] constants below so there is one definition of the session
//! shape.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Seven days, the lifetime of every session cookie.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Name and policy of one session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSpec {
    pub name: &'static str,
    /// Hidden from page scripts.
    pub http_only: bool,
    pub max_age: Duration,
}

pub const ACCESS_TOKEN: CookieSpec = CookieSpec { name: "accessToken", http_only: true, max_age: SESSION_MAX_AGE };
pub const REFRESH_TOKEN: CookieSpec = CookieSpec { name: "refreshToken", http_only: true, max_age: SESSION_MAX_AGE };
/// Readable by page code so it can build the admin-identity header.
pub const USER_ID: CookieSpec = CookieSpec { name: "userId", http_only: false, max_age: SESSION_MAX_AGE };

/// Every cookie that makes up a session.
pub const SESSION_COOKIES: [CookieSpec; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, USER_ID];

/// Cookie storage access.
pub trait CookieStore: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, spec: &CookieSpec, value: &str);
    fn remove(&self, name: &str);
}

/// Tokens and identity issued at sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: Option<String>,
}

impl Session {
    /// Read the session from `store`. Requires a non-empty access token.
    #[must_use]
    pub fn load(store: &dyn CookieStore) -> Option<Self> {
        let access_token = non_empty(store.get(ACCESS_TOKEN.name))?;
        Some(Self {
            access_token,
            refresh_token: non_empty(store.get(REFRESH_TOKEN.name)),
            user_id: non_empty(store.get(USER_ID.name)),
        })
    }

    /// Write every present field to `store`. Absent fields are removed so a
    /// rotated session never mixes with a previous one.
    pub fn save(&self, store: &dyn CookieStore) {
        store.set(&ACCESS_TOKEN, &self.access_token);
        match &self.refresh_token {
            Some(token) => store.set(&REFRESH_TOKEN, token),
            None => store.remove(REFRESH_TOKEN.name),
        }
        match &self.user_id {
            Some(id) => store.set(&USER_ID, id),
            None => store.remove(USER_ID.name),
        }
    }

    /// Delete every session cookie.
    pub fn clear(store: &dyn CookieStore) {
        for spec in &SESSION_COOKIES {
            store.remove(spec.name);
        }
    }
}

/// Current access token, if any.
#[must_use]
pub fn access_token(store: &dyn CookieStore) -> Option<String> {
    non_empty(store.get(ACCESS_TOKEN.name))
}

/// Current refresh token, if any.
#[must_use]
pub fn refresh_token(store: &dyn CookieStore) -> Option<String> {
    non_empty(store.get(REFRESH_TOKEN.name))
}

/// Current admin user id, if any.
#[must_use]
pub fn user_id(store: &dyn CookieStore) -> Option<String> {
    non_empty(store.get(USER_ID.name))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// MEMORY STORE
// =============================================================================

struct StoredCookie {
    value: String,
    expires_at: Instant,
}

/// In-process cookie jar honoring each cookie's max age.
#[derive(Default)]
pub struct MemoryCookieStore {
    cookies: RwLock<HashMap<String, StoredCookie>>,
}

impl MemoryCookieStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from an existing session.
    #[must_use]
    pub fn with_session(session: &Session) -> Self {
        let store = Self::new();
        session.save(&store);
        store
    }
}

impl CookieStore for MemoryCookieStore {
    fn get(&self, name: &str) -> Option<String> {
        let cookies = self
            .cookies
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cookies
            .get(name)
            .filter(|c| c.expires_at > Instant::now())
            .map(|c| c.value.clone())
    }

    fn set(&self, spec: &CookieSpec, value: &str) {
        let mut cookies = self
            .cookies
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cookies.insert(
            spec.name.to_owned(),
            StoredCookie { value: value.to_owned(), expires_at: Instant::now() + spec.max_age },
        );
    }

    fn remove(&self, name: &str) {
        let mut cookies = self
            .cookies
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        cookies.remove(name);
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
