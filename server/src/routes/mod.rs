//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server fronts the dashboard pages. It owns the session cookies (the
//! auth routes below), runs the routing guard on every request, and serves
//! the page assets from `WEBSITE_DIR` for everything else. Data requests go
//! from the pages to the backend directly, carrying the cookies' tokens.

pub mod auth;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::Redirect;
use axum::routing::{get, post};
use dashboard::guard::LANDING_ROUTE;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::guard::route_guard;
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/session", get(auth::session))
        .route("/healthz", get(healthz))
        .route("/", get(redirect_root))
}

/// Full application: API routes, guarded pages, static assets.
pub fn app(state: AppState, website_dir: &Path) -> Router {
    let website = ServeDir::new(website_dir).append_index_html_on_directories(true);
    api_routes()
        .fallback_service(website)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_root() -> Redirect {
    Redirect::temporary(LANDING_ROUTE)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
