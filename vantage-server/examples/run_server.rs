//! Example to run the VANTAGE server standalone
//!
//! Run with: cargo run -p vantage-server --example run_server

use tracing_subscriber::EnvFilter;
use vantage_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::default();

    println!("Starting VANTAGE server on port {}", config.port);
    println!("Try: curl http://localhost:{}/api/status", config.port);

    run_server(config).await
}
