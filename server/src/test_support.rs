//! Helpers for route tests: serve routers on ephemeral ports and talk to them
//! with a real HTTP client.

use std::path::Path;

use axum::Router;
use dashboard::config::ApiConfig;
use dashboard::guard::GuardPolicy;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("test listener should bind");
    let addr = listener.local_addr().expect("test listener address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("test server should run");
    });
    format!("http://{addr}")
}

pub fn state_for(backend_url: &str, guard: GuardPolicy) -> AppState {
    let config = ServerConfig {
        port: 0,
        api: ApiConfig::new(backend_url).expect("test backend url"),
        cookie_secure: false,
        guard,
        website_dir: Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/site"),
    };
    AppState::new(&config).expect("test state")
}

/// Serve the full app against `backend_url` and return its base URL.
pub async fn serve_app(backend_url: &str, guard: GuardPolicy) -> String {
    let state = state_for(backend_url, guard);
    let site = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/site");
    serve(routes::app(state, &site)).await
}

/// Client that reports redirects instead of following them.
pub fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test http client")
}

/// All `Set-Cookie` values on a response.
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_owned)
        .collect()
}

/// The `Set-Cookie` value for `name`.
pub fn set_cookie(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
}
