//! Play command - engine self-play from the start position
//!
//! ## Architecture
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: RNG and output helpers

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use vantage_core::{AlphaBetaAI, Color, GameSession, GameStatus, Move};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// AI search depth
    #[arg(long, default_value = "2")]
    pub depth: i32,

    /// Time limit per engine move
    #[arg(long, default_value = "1000")]
    pub time_limit_ms: u64,

    /// Stop a game after this many plies
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Opening plies chosen at random so games differ
    #[arg(long, default_value = "0")]
    pub random_plies: usize,

    /// RNG seed for the random opening plies
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write game records as JSON
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Result of a single game
#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    pub game_number: usize,
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub plies: usize,
    pub moves: Vec<String>,
    pub finished_at: DateTime<Utc>,
}

/// Aggregated results
#[derive(Clone, Debug, Serialize)]
pub struct PlayResults {
    pub white_wins: usize,
    pub black_wins: usize,
    pub draws: usize,
    pub avg_plies: f32,
    pub games: Vec<GameRecord>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

pub fn run(args: PlayArgs) -> Result<()> {
    tracing::info!(
        "Self-play: {} games, depth={}, time_limit_ms={}, random_plies={}",
        args.games,
        args.depth,
        args.time_limit_ms,
        args.random_plies
    );

    let results = play_games(&args)?;
    report_results(&results);

    if let Some(path) = &args.output {
        save_results(&results, path)?;
        tracing::info!("Game records written to {}", path.display());
    }
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_games(args: &PlayArgs) -> Result<PlayResults> {
    let ai = build_ai(args);
    let mut rng = create_rng(args.seed);

    let pb = ProgressBar::new(args.games as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games")?
            .progress_chars("#>-"),
    );

    let mut games = Vec::with_capacity(args.games);
    for game_number in 1..=args.games {
        let record = play_single_game(&ai, game_number, args, &mut rng)?;
        pb.println(format!(
            "Game {}: {} after {} plies",
            record.game_number, record.status, record.plies
        ));
        games.push(record);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(compute_statistics(games))
}

fn report_results(results: &PlayResults) {
    let total = results.games.len();
    println!("\n=== Self-play Results ===");
    println!("Total games: {}", total);
    println!("White wins:  {}", results.white_wins);
    println!("Black wins:  {}", results.black_wins);
    println!("Draws:       {}", results.draws);
    println!("Avg plies:   {:.1}", results.avg_plies);
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game; the first `random_plies` plies are uniform random
pub fn play_single_game(
    ai: &AlphaBetaAI,
    game_number: usize,
    args: &PlayArgs,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut session = GameSession::standard();

    while !session.status().is_over() && session.history().len() < args.max_plies {
        if session.history().len() < args.random_plies {
            let moves = session.legal_moves();
            let Some(mv) = moves.choose(rng) else {
                break;
            };
            session.play_move(mv)?;
        } else if session.play_engine(ai)?.is_none() {
            break;
        }
    }

    Ok(GameRecord {
        game_number,
        status: session.status(),
        winner: session.winner(),
        plies: session.history().len(),
        moves: session.history().iter().map(Move::to_string).collect(),
        finished_at: Utc::now(),
    })
}

fn compute_statistics(games: Vec<GameRecord>) -> PlayResults {
    let white_wins = games.iter().filter(|g| g.winner == Some(Color::White)).count();
    let black_wins = games.iter().filter(|g| g.winner == Some(Color::Black)).count();
    let draws = games.len() - white_wins - black_wins;

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    PlayResults {
        white_wins,
        black_wins,
        draws,
        avg_plies,
        games,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Engine for both sides; every move is time-boxed
fn build_ai(args: &PlayArgs) -> AlphaBetaAI {
    AlphaBetaAI::new(args.depth).with_time_limit(Duration::from_millis(args.time_limit_ms))
}

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn save_results(results: &PlayResults, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write game records: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(max_plies: usize, random_plies: usize) -> PlayArgs {
        PlayArgs {
            depth: 1,
            time_limit_ms: 200,
            max_plies,
            games: 1,
            random_plies,
            seed: Some(42),
            output: None,
        }
    }

    #[test]
    fn test_single_game_respects_ply_limit() {
        let ai = AlphaBetaAI::new(1);
        let mut rng = create_rng(Some(1));
        let record = play_single_game(&ai, 1, &args(8, 2), &mut rng).unwrap();

        assert!(record.plies <= 8);
        assert_eq!(record.moves.len(), record.plies);
    }

    #[test]
    fn test_random_openings_are_seeded() {
        let ai = AlphaBetaAI::new(1);
        let a = play_single_game(&ai, 1, &args(4, 4), &mut create_rng(Some(7))).unwrap();
        let b = play_single_game(&ai, 1, &args(4, 4), &mut create_rng(Some(7))).unwrap();
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn test_engine_is_time_boxed() {
        let ai = build_ai(&args(8, 0));
        assert_eq!(ai.limits.depth, 1);
        assert_eq!(ai.limits.time_limit, Some(Duration::from_millis(200)));

        let mut rng = create_rng(Some(3));
        let record = play_single_game(&ai, 1, &args(8, 0), &mut rng).unwrap();
        assert!(record.plies <= 8);
    }

    #[test]
    fn test_statistics() {
        let game = |winner: Option<Color>| GameRecord {
            game_number: 1,
            status: if winner.is_some() {
                GameStatus::Checkmate
            } else {
                GameStatus::Ongoing
            },
            winner,
            plies: 10,
            moves: Vec::new(),
            finished_at: Utc::now(),
        };
        let results = compute_statistics(vec![game(Some(Color::White)), game(None), game(Some(Color::Black))]);
        assert_eq!(results.white_wins, 1);
        assert_eq!(results.black_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_plies, 10.0);
    }
}
