//! Position evaluation

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Piece};

/// Score of a decisive loss for the side to move (checkmate)
pub const WIN_VALUE: f32 = 100000.0;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Material value by piece-type index. The king is deliberately the
    /// most valuable entry so trades never put it at risk.
    pub piece_values: [f32; 6],
    /// Positional bonus for a piece standing on the centre
    pub center_bonus: f32,
    /// Bonus lost per step of Manhattan distance from the centre
    pub center_step: f32,
}

impl Heuristics {
    pub const STANDARD: Heuristics = Heuristics {
        piece_values: [100.0, 900.0, 300.0, 300.0, 500.0, 350.0],
        center_bonus: 40.0,
        center_step: 6.0,
    };

    /// Material value; reserved or unknown types are worth nothing
    pub fn piece_value(&self, piece: Piece) -> f32 {
        piece
            .kind()
            .map(|kind| self.piece_values[kind.index() as usize])
            .unwrap_or(0.0)
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Evaluate from `perspective`'s point of view with the standard weights
pub fn evaluate(board: &Board, perspective: Color) -> f32 {
    evaluate_with(board, perspective, &Heuristics::STANDARD)
}

/// Material plus centralisation, own pieces adding and opponent pieces
/// subtracting
pub fn evaluate_with(board: &Board, perspective: Color, heuristics: &Heuristics) -> f32 {
    material(board, perspective, heuristics) + positional(board, perspective, heuristics)
}

/// Signed material sum
pub fn material(board: &Board, perspective: Color, heuristics: &Heuristics) -> f32 {
    board
        .pieces()
        .map(|(_, piece)| sign(piece, perspective) * heuristics.piece_value(piece))
        .sum()
}

/// Signed centralisation bonus, counted for every piece on the board
pub fn positional(board: &Board, perspective: Color, heuristics: &Heuristics) -> f32 {
    let center_row = (board.rows() as f32 - 1.0) / 2.0;
    let center_col = (board.cols() as f32 - 1.0) / 2.0;

    board
        .pieces()
        .map(|(sq, piece)| {
            let dist = (center_row - sq.row as f32).abs() + (center_col - sq.col as f32).abs();
            let bonus = (heuristics.center_bonus - dist * heuristics.center_step).max(0.0);
            sign(piece, perspective) * bonus
        })
        .sum()
}

fn sign(piece: Piece, perspective: Color) -> f32 {
    if piece.color == perspective {
        1.0
    } else {
        -1.0
    }
}
