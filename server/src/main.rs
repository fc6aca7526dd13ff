mod config;
mod guard;
mod routes;
mod state;

#[cfg(test)]
mod test_support;

use dashboard::config::ConfigError;
use dashboard::error::ApiError;

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("backend client: {0}")]
    Client(#[from] ApiError),
    #[error("failed to bind port {port}: {source}")]
    Bind { port: u16, source: std::io::Error },
    #[error("server failed: {0}")]
    Serve(std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env()?;
    let state = state::AppState::new(&config)?;
    if config.guard.enforce_protected {
        tracing::info!("guard enforcing sign-in on protected routes");
    }

    let app = routes::app(state, &config.website_dir);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|source| StartupError::Bind { port, source })?;

    tracing::info!(%port, backend = %config.api.base_url, "dashboard server listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
