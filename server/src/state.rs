//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! server holds no session state of its own: tokens live in the browser's
//! cookies and are forwarded per request, so the backend client here carries
//! an empty cookie store.

use std::sync::Arc;

use dashboard::ApiClient;
use dashboard::error::ApiError;
use dashboard::guard::GuardPolicy;
use dashboard::session::MemoryCookieStore;

use crate::config::ServerConfig;

/// Clone is required by Axum; the client is Arc-backed.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub guard: GuardPolicy,
    pub cookie_secure: bool,
}

impl AppState {
    /// # Errors
    ///
    /// Returns an error if the backend client cannot be built.
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api, Arc::new(MemoryCookieStore::new()))?;
        Ok(Self { api, guard: config.guard, cookie_secure: config.cookie_secure })
    }
}
