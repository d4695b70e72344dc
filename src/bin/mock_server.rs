use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use model_client::{sim_server, AppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    let listener = TcpListener::bind(config.mock_server_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.mock_server_addr))?;

    sim_server::serve(listener)
        .await
        .context("Mock server stopped unexpectedly")
}
