//! Best command - ask the engine for a move
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), search(), report()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use vantage_core::{Board, Color, EngineConfig, SearchReport};

use crate::board_io::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct BestArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Search depth, clamped to 1..=10 (overrides the config file)
    #[arg(long)]
    pub depth: Option<i32>,

    /// Stop deepening after this many milliseconds
    #[arg(long)]
    pub time_limit_ms: Option<u64>,

    /// Engine config JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: BestArgs) -> Result<()> {
    let board = args.board.load()?;
    let config = build_config(&args)?;

    tracing::info!(
        "Searching for {} (depth={}, time_limit_ms={:?})",
        args.board.color,
        config.limits().clamped_depth(),
        config.time_limit_ms
    );

    let report = search(&board, args.board.color, &config);
    print_report(&report, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Defaults, then the config file, then explicit flags
fn build_config(args: &BestArgs) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config: {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(depth) = args.depth {
        config.depth = depth;
    }
    if args.time_limit_ms.is_some() {
        config.time_limit_ms = args.time_limit_ms;
    }
    Ok(config)
}

fn search(board: &Board, color: Color, config: &EngineConfig) -> SearchReport {
    config.ai().search_with_progress(board, color, |progress| {
        tracing::info!(
            "depth {}: score {:.1}, best {}, {} nodes in {:?}",
            progress.depth,
            progress.score,
            progress
                .best_move
                .map(|mv| mv.to_string())
                .unwrap_or_else(|| "none".to_string()),
            progress.nodes,
            progress.elapsed
        );
    })
}

fn print_report(report: &SearchReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match report.best_move {
        Some(mv) => println!(
            "{} ({}) score {:.1}, depth {}, {} nodes, {} ms{}",
            mv,
            mv.piece.name(),
            report.score,
            report.depth_reached,
            report.nodes,
            report.elapsed_ms,
            if report.timed_out { ", timed out" } else { "" }
        ),
        None => println!("No legal move"),
    }
    Ok(())
}
