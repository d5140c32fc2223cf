//! Ethereum JSON-RPC Formatting Proxy
//!
//! Entry point for the proxy server. Loads configuration from
//! environment/.env file and starts the JSON-RPC server on the configured
//! port, forwarding every call to the backend node.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use eth_rpc_format::config::Config;
use eth_rpc_format::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    info!("=== Ethereum JSON-RPC Formatting Proxy ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("");

    info!("Configuration:");
    info!("  Proxy Port: {}", config.proxy_port);
    info!("  Backend RPC: {}", config.backend_rpc_url);
    info!("  Backend Dialect: {:?}", config.backend_dialect);
    info!("  Fill Default Fields: {}", config.fill_default_fields);
    info!("  Gas Estimate Multiplier: {}", config.gas_estimate_multiplier);
    info!("  Log Filter: {}", config.log_level);
    if let Some(path) = &config.schema_file {
        info!("  Schema File: {}", path.display());
    }
    info!("");

    start_server(config).await?;

    Ok(())
}
