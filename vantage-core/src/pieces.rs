//! Piece type definitions and the movement rule table

use serde::{Deserialize, Serialize};

use crate::board::Color;

/// Piece type. The discriminants are the board encoding and index the
/// movement and value tables; King is 1, not 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PieceType {
    Pawn = 0,
    King = 1,
    Knight = 2,
    Bishop = 3,
    Rook = 4,
    Queen = 5,
}

/// All piece types in index order
pub const PIECE_TYPES: [PieceType; 6] = [
    PieceType::Pawn,
    PieceType::King,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Rook,
    PieceType::Queen,
];

impl PieceType {
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Resolve a board index. Index 6 and everything from 7 up are reserved.
    pub fn from_index(idx: u8) -> Option<Self> {
        PIECE_TYPES.get(idx as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceType::Pawn => "Pawn",
            PieceType::King => "King",
            PieceType::Knight => "Knight",
            PieceType::Bishop => "Bishop",
            PieceType::Rook => "Rook",
            PieceType::Queen => "Queen",
        }
    }

    pub fn movement(self) -> &'static MovementSpec {
        movement(self)
    }
}

// ============================================================================
// MOVEMENT SPECS
// ============================================================================

/// Movement vector `(dx, dy)` in the white-forward frame: `dx` is a column
/// delta, positive `dy` points toward the opponent.
pub type Vector = (i8, i8);

/// Predicate deciding whether a (piece type, colour) pair may hop one
/// square past its first capture
pub type JumpRule = fn(PieceType, Color) -> bool;

/// How a piece type moves
#[derive(Clone, Copy, Debug)]
pub enum MovementSpec {
    /// One step along each vector, never blocked
    FixedLeap(&'static [Vector]),
    /// One destination per pair of sub-vectors, landing on their sum;
    /// nothing in between can block it
    CompoundLeap(&'static [(Vector, Vector)]),
    /// Repeat each vector until the edge or the first occupied square
    UnlimitedSlide(&'static [Vector]),
    /// Slide; when `jump` holds for the mover, take one more step past
    /// the first capture
    SpecialSlideWithJump {
        vectors: &'static [Vector],
        jump: JumpRule,
    },
}

impl MovementSpec {
    /// Stable name of the variant
    pub fn kind_name(&self) -> &'static str {
        match self {
            MovementSpec::FixedLeap(_) => "fixed_leap",
            MovementSpec::CompoundLeap(_) => "compound_leap",
            MovementSpec::UnlimitedSlide(_) => "unlimited_slide",
            MovementSpec::SpecialSlideWithJump { .. } => "special_slide_with_jump",
        }
    }

    /// Net displacement vectors, compound leaps summed
    pub fn vectors(&self) -> Vec<Vector> {
        match self {
            MovementSpec::FixedLeap(vectors)
            | MovementSpec::UnlimitedSlide(vectors)
            | MovementSpec::SpecialSlideWithJump { vectors, .. } => vectors.to_vec(),
            MovementSpec::CompoundLeap(pairs) => pairs.iter().map(|&(a, b)| sum(a, b)).collect(),
        }
    }

    /// Whether this movement lets the given mover hop past a capture
    pub fn allows_jump(&self, piece: PieceType, color: Color) -> bool {
        match self {
            MovementSpec::SpecialSlideWithJump { jump, .. } => jump(piece, color),
            _ => false,
        }
    }
}

pub(crate) fn sum(a: Vector, b: Vector) -> Vector {
    (a.0 + b.0, a.1 + b.1)
}

/// Board-frame `(drow, dcol)` for a vector as seen by `color`
pub fn board_delta(v: Vector, color: Color) -> (i8, i8) {
    (color.forward() * v.1, v.0)
}

const PAWN_VECTORS: &[Vector] = &[(1, 1), (-1, 1)];

const KING_VECTORS: &[Vector] = &[
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (-1, 0),
    (1, 0),
    (0, 1),
    (0, -1),
];

/// Two-square leaps, each built from two perpendicular halves
const KNIGHT_LEGS: &[(Vector, Vector)] = &[
    ((1, 1), (1, -1)),
    ((-1, 1), (-1, -1)),
    ((1, 1), (-1, 1)),
    ((1, -1), (-1, -1)),
    ((2, 0), (0, 2)),
    ((-2, 0), (0, 2)),
    ((-2, 0), (0, -2)),
    ((2, 0), (0, -2)),
];

const DIAGONALS: &[Vector] = &[(1, 1), (-1, 1), (-1, -1), (1, -1)];

const ORTHOGONALS: &[Vector] = &[(0, 1), (0, -1), (1, 0), (-1, 0)];

const ALL_LINES: &[Vector] = &[
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
];

// Only the white rook hops; not mirrored for black.
fn white_rook_jumps(piece: PieceType, color: Color) -> bool {
    piece == PieceType::Rook && color == Color::White
}

/// Movement rules indexed by `PieceType`
pub static MOVEMENT_TABLE: [MovementSpec; 6] = [
    MovementSpec::FixedLeap(PAWN_VECTORS),
    MovementSpec::FixedLeap(KING_VECTORS),
    MovementSpec::CompoundLeap(KNIGHT_LEGS),
    MovementSpec::UnlimitedSlide(DIAGONALS),
    MovementSpec::SpecialSlideWithJump {
        vectors: ORTHOGONALS,
        jump: white_rook_jumps,
    },
    MovementSpec::UnlimitedSlide(ALL_LINES),
];

/// Movement rule for a piece type
pub fn movement(piece: PieceType) -> &'static MovementSpec {
    &MOVEMENT_TABLE[piece as usize]
}
