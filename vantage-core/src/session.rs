//! Game session: the board, the side to move and what has happened so far
//!
//! The engine itself is stateless. Anything that must survive between
//! moves (captures, history, the last move) lives here and is owned by
//! the caller.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai::AlphaBetaAI;
use crate::board::{Board, Color, Piece, Square};
use crate::error::{Error, Result};
use crate::movegen::Move;
use crate::rules::{self, GameStatus};

/// A piece taken off the board and the move that took it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPiece {
    pub piece: Piece,
    pub by: Move,
}

/// What happened when a move was played
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    #[serde(rename = "move")]
    pub mv: Move,
    pub captured: Option<Piece>,
    /// Status of the side that moves next
    pub opponent_status: GameStatus,
}

/// A game in progress
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    board: Board,
    to_move: Color,
    captured: Vec<CapturedPiece>,
    history: Vec<Move>,
    status: GameStatus,
}

impl GameSession {
    pub fn new(board: Board, to_move: Color) -> Self {
        let status = rules::status(&board, to_move);
        Self {
            board,
            to_move,
            captured: Vec::new(),
            history: Vec::new(),
            status,
        }
    }

    /// Standard start position, White to move
    pub fn standard() -> Self {
        Self::new(Board::standard(), Color::White)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.to_move
    }

    pub fn captured(&self) -> &[CapturedPiece] {
        &self.captured
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// The side that delivered mate, if the game ended that way
    pub fn winner(&self) -> Option<Color> {
        match self.status {
            GameStatus::Checkmate => Some(self.to_move.opponent()),
            _ => None,
        }
    }

    /// Legal moves for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        rules::legal_moves(&self.board, self.to_move)
    }

    /// Play `from` to `to` for the side to move
    pub fn play(&mut self, from: Square, to: Square) -> Result<MoveOutcome> {
        self.ensure_ongoing()?;

        match self.board.get(from) {
            Some(piece) if piece.color == self.to_move => {}
            _ => {
                return Err(Error::NoPiece {
                    color: self.to_move,
                    square: from,
                })
            }
        }

        let mv = rules::legal_moves_from(&self.board, from)
            .into_iter()
            .find(|mv| mv.to == to)
            .ok_or(Error::IllegalMove {
                color: self.to_move,
                from,
                to,
            })?;

        Ok(self.apply(mv))
    }

    /// Play an already generated move, checking it is legal here
    pub fn play_move(&mut self, mv: &Move) -> Result<MoveOutcome> {
        if mv.color != self.to_move {
            return Err(Error::NoPiece {
                color: self.to_move,
                square: mv.from,
            });
        }
        self.play(mv.from, mv.to)
    }

    /// Let the engine pick and play a move for the side to move.
    /// Ok(None) when it has no legal move.
    pub fn play_engine(&mut self, ai: &AlphaBetaAI) -> Result<Option<MoveOutcome>> {
        self.ensure_ongoing()?;

        match ai.best_move(&self.board, self.to_move) {
            Some(mv) => Ok(Some(self.apply(mv))),
            None => Ok(None),
        }
    }

    fn ensure_ongoing(&self) -> Result<()> {
        if self.status.is_over() {
            return Err(Error::GameOver(self.status));
        }
        Ok(())
    }

    fn apply(&mut self, mv: Move) -> MoveOutcome {
        let captured = self.board.get(mv.to);
        if let Some(piece) = captured {
            debug!(%mv, %piece, "piece captured");
            self.captured.push(CapturedPiece { piece, by: mv });
        }

        self.board = self.board.apply_move(&mv);
        self.history.push(mv);
        self.to_move = self.to_move.opponent();
        self.status = rules::status(&self.board, self.to_move);

        match self.status {
            GameStatus::Ongoing => debug!(%mv, "move played"),
            status => info!(%mv, side = %self.to_move, %status, "move played"),
        }

        MoveOutcome {
            mv,
            captured,
            opponent_status: self.status,
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::standard()
    }
}
