use anyhow::Context;
use pix_gateway_adapter::app::config::Config;
use pix_gateway_adapter::services::{PixGatewayClient, PixService};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    info!("Starting PIX gateway adapter on port {}", config.server_port);

    let gateway = PixGatewayClient::new(&config).context("building gateway HTTP client")?;
    if !gateway.has_credential() {
        warn!("PAYEVO_SECRET_KEY is not set; PIX creation will fail until it is configured");
    }
    if config.default_customer.is_none() {
        info!("Default customer disabled; anonymous PIX requests will be rejected");
    }

    let service = Arc::new(PixService::new(&config, Arc::new(gateway)));
    let app = pix_gateway_adapter::router(service);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
