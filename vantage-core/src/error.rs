//! Boundary validation errors
//!
//! Move generation, legality and search are total and never fail. These
//! errors only come from parsing caller input and from session moves.

use crate::board::{Color, Square};
use crate::rules::GameStatus;

/// Errors raised when validating caller input
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid piece token `{0}` (expected e.g. `w4` or `b1`)")]
    InvalidPiece(String),

    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    #[error("board has no rows")]
    EmptyBoard,

    #[error("board is too large: {rows} rows x {cols} columns")]
    BoardTooLarge { rows: usize, cols: usize },

    #[error("malformed board JSON: {0}")]
    BoardJson(#[from] serde_json::Error),

    #[error("no {color} piece on {square}")]
    NoPiece { color: Color, square: Square },

    #[error("{from}-{to} is not a legal move for {color}")]
    IllegalMove { color: Color, from: Square, to: Square },

    #[error("game is already over ({0})")]
    GameOver(GameStatus),
}

pub type Result<T> = std::result::Result<T, Error>;
