use anyhow::Context;
use portfolio_api::config::ProxyConfig;
use portfolio_api::proxy::{self, ProxyState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ProxyConfig::from_env().context("invalid proxy configuration")?;
    info!(
        "Starting portfolio proxy in {:?} mode, forwarding to {}",
        config.environment, config.api_url
    );

    let state = ProxyState::new(config.api_url, config.timeout)?;

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Portfolio proxy listening on http://{}", bind_addr);

    axum::serve(listener, proxy::router(state)).await?;
    Ok(())
}
