//! VANTAGE Core - Rules engine and AI
//!
//! This crate provides the core game logic for VANTAGE:
//! - Board model (8x8 grid of colour/piece-index cells) and interchange
//! - Piece types and the movement rule table
//! - Pseudo-legal move generation and the legality filter
//! - Position evaluation (material and centralisation)
//! - Negamax alpha-beta AI with quiescence and optional time-boxing
//! - Game sessions owned by the caller

pub mod board;
pub mod pieces;
pub mod movegen;
pub mod rules;
pub mod eval;
pub mod ai;
pub mod session;
pub mod config;
pub mod error;

// Re-exports for convenient access
pub use board::{Board, Color, Piece, Rows, Square, BOARD_SIZE};
pub use pieces::{movement, MovementSpec, PieceType, Vector, MOVEMENT_TABLE, PIECE_TYPES};
pub use movegen::{generate_captures, generate_moves, pseudo_destinations, Destinations, Move};
pub use rules::{in_check, is_checkmate, is_legal, is_square_attacked, is_stalemate, legal_moves, GameStatus};
pub use eval::{evaluate, evaluate_with, Heuristics, WIN_VALUE};
pub use ai::{find_best_move, AlphaBetaAI, SearchLimits, SearchProgress, SearchReport, SearchResult};
pub use session::{CapturedPiece, GameSession, MoveOutcome};
pub use config::EngineConfig;
pub use error::{Error, Result};
