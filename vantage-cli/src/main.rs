//! VANTAGE CLI - Command-line interface
//!
//! Commands:
//! - moves: List legal moves for a colour
//! - status: Report check, checkmate or stalemate
//! - best: Ask the engine for a move
//! - play: Engine self-play from the start position
//! - serve: Start the HTTP server

mod best;
mod board_io;
mod inspect;
mod play;
mod server;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vantage")]
#[command(version)]
#[command(about = "VANTAGE move engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List legal moves
    Moves(inspect::MovesArgs),
    /// Report check / checkmate / stalemate
    Status(inspect::StatusArgs),
    /// Pick the engine's best move
    Best(best::BestArgs),
    /// Engine self-play
    Play(play::PlayArgs),
    /// Start HTTP server
    Serve(server::ServerArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Moves(args) => inspect::run_moves(args),
        Commands::Status(args) => inspect::run_status(args),
        Commands::Best(args) => best::run(args),
        Commands::Play(args) => play::run(args),
        Commands::Serve(args) => server::run(args),
    }
}
