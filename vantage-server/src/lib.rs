//! VANTAGE Server - HTTP API for the board UI
//!
//! This crate provides the web backend:
//! - Stateless analysis: legal moves, check status, best move
//! - Single-player game sessions against the engine
//!
//! Engine searches run on tokio's blocking pool; session locks are never
//! held across a search.

mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use state::{HostedGame, ServerState};

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Depth for requests that do not name one
    pub default_depth: i32,
    /// Time limit for requests that do not name one
    pub time_limit_ms: Option<u64>,
    /// Hosted games kept before old ones are evicted
    pub max_games: usize,
}

/// Search time limit applied when neither the request nor the operator sets one
pub const DEFAULT_TIME_LIMIT_MS: u64 = 2000;

/// Hosted game capacity
pub const DEFAULT_MAX_GAMES: usize = 1024;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8002,
            default_depth: vantage_core::ai::DEFAULT_DEPTH,
            time_limit_ms: Some(DEFAULT_TIME_LIMIT_MS),
            max_games: DEFAULT_MAX_GAMES,
        }
    }
}

/// Create the router with all routes
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Movement rule table
        .route("/api/pieces", get(routes::pieces::get_pieces))
        // Stateless analysis
        .route("/api/moves", post(routes::analysis::legal_moves))
        .route("/api/check", post(routes::analysis::check_status))
        .route("/api/best-move", post(routes::analysis::best_move))
        // Game API
        .route("/api/game/start", post(routes::game::start_game))
        .route("/api/game/:id", get(routes::game::get_game))
        .route("/api/game/:id/move", post(routes::game::make_player_move))
        .route("/api/game/:id/ai-move", post(routes::game::make_ai_move))
        // Shared state
        .with_state(state)
        // The board UI is served from elsewhere
        .layer(CorsLayer::permissive())
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new(config.clone()));
    let router = create_router(state);

    tracing::info!("VANTAGE Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!(
        "Default search: depth {}, time limit {:?} ms, up to {} games",
        config.default_depth,
        config.time_limit_ms,
        config.max_games
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
