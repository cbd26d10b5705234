mod config;
mod error;
mod routes;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use ratewatch_core::RateEngineBuilder;

use crate::config::ServerConfig;

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    init_tracing();

    let config = ServerConfig::from_env();
    let engine = RateEngineBuilder::from_env().build();
    let router = routes::app_router(engine, &config.static_dir);

    tracing::info!(listen_addr = %config.listen_addr, "ratewatch listening");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
