//! Server command - start the HTTP server
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_server(), start_server()
//! - Level 3: (delegated to vantage-server crate)

use anyhow::Result;
use clap::Args;

use vantage_server::{run_server, ServerConfig, DEFAULT_MAX_GAMES, DEFAULT_TIME_LIMIT_MS};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct ServerArgs {
    /// Port number to listen on
    #[arg(long, default_value = "8002")]
    pub port: u16,

    /// Default search depth for requests that do not give one
    #[arg(long, default_value = "2")]
    pub depth: i32,

    /// Default time limit for engine searches
    #[arg(long, default_value_t = DEFAULT_TIME_LIMIT_MS)]
    pub time_limit_ms: u64,

    /// Hosted games kept before the oldest are evicted
    #[arg(long, default_value_t = DEFAULT_MAX_GAMES)]
    pub max_games: usize,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run server command
pub fn run(args: ServerArgs) -> Result<()> {
    let config = configure_server(&args)?;

    tracing::info!("Starting VANTAGE server on port {}", config.port);

    start_server(config)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Configure server from command arguments
fn configure_server(args: &ServerArgs) -> Result<ServerConfig> {
    if !(1..=10).contains(&args.depth) {
        anyhow::bail!("Depth must be between 1 and 10, got {}", args.depth);
    }
    if args.time_limit_ms == 0 {
        anyhow::bail!("Time limit must be at least 1 ms");
    }

    Ok(ServerConfig {
        port: args.port,
        default_depth: args.depth,
        time_limit_ms: Some(args.time_limit_ms),
        max_games: args.max_games,
    })
}

/// Start the server (blocking)
fn start_server(config: ServerConfig) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;

    runtime.block_on(async { run_server(config).await })
}

// ============================================================================
// TESTS
// ============================================================================
