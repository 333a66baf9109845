//! Moves and status commands - inspect a position without searching

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use vantage_core::rules::{self, legal_moves_from};
use vantage_core::{Board, Color, GameStatus, Move, Square};

use crate::board_io::BoardArgs;

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct MovesArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Only moves of the piece on this square (e.g. e2)
    #[arg(long)]
    pub from: Option<Square>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatusArgs {
    #[command(flatten)]
    pub board: BoardArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    color: Color,
    in_check: bool,
    checkmate: bool,
    stalemate: bool,
    status: GameStatus,
    legal_moves: usize,
}

// ============================================================================
// COMMANDS
// ============================================================================

pub fn run_moves(args: MovesArgs) -> Result<()> {
    let board = args.board.load()?;
    let moves = collect_moves(&board, args.board.color, args.from);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&moves)?);
        return Ok(());
    }

    println!("{}", board);
    println!("{} legal moves for {}:", moves.len(), args.board.color);
    for mv in &moves {
        println!("  {:<8} {}", mv.to_string(), mv.piece.name());
    }
    Ok(())
}

pub fn run_status(args: StatusArgs) -> Result<()> {
    let board = args.board.load()?;
    let report = status_report(&board, args.board.color);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", board);
        println!(
            "{}: {} ({} legal moves)",
            report.color, report.status, report.legal_moves
        );
    }
    Ok(())
}

// ============================================================================
// HELPERS
// ============================================================================

fn collect_moves(board: &Board, color: Color, from: Option<Square>) -> Vec<Move> {
    match from {
        Some(sq) => legal_moves_from(board, sq)
            .into_iter()
            .filter(|mv| mv.color == color)
            .collect(),
        None => rules::legal_moves(board, color),
    }
}

fn status_report(board: &Board, color: Color) -> StatusReport {
    let status = rules::status(board, color);
    StatusReport {
        color,
        in_check: rules::in_check(board, color),
        checkmate: status == GameStatus::Checkmate,
        stalemate: status == GameStatus::Stalemate,
        status,
        legal_moves: rules::legal_moves(board, color).len(),
    }
}
