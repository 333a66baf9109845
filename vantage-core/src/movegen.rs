//! Pseudo-legal move generation
//!
//! Walks the movement rule table for each piece. Nothing here checks
//! whether the mover's own king ends up attacked; see `rules` for that.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Square};
use crate::pieces::{board_delta, movement, sum, MovementSpec, PieceType, Vector};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Ordering score for capturing a piece with code 6
pub const CAPTURE_BASE_SCORE: i32 = 120;

/// Ordering change per code step of the captured piece, lower codes first
pub const CAPTURE_INDEX_STEP: i32 = 8;

/// Ordering score when there is no piece on the capture square
pub const UNKNOWN_CAPTURE_SCORE: i32 = 50;

// ============================================================================
// TYPES
// ============================================================================

/// Pseudo-legal destinations of one piece
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Destinations {
    pub quiet: Vec<Square>,
    pub captures: Vec<Square>,
}

impl Destinations {
    /// Quiet destinations followed by captures
    pub fn all(&self) -> impl Iterator<Item = Square> + '_ {
        self.quiet.iter().chain(self.captures.iter()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.quiet.is_empty() && self.captures.is_empty()
    }
}

/// A generated move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: PieceType,
    pub color: Color,
    pub is_capture: bool,
    /// Move-ordering estimate, 0 for quiet moves
    pub capture_score: i32,
}

impl Move {
    /// Key used to put promising captures first
    pub fn ordering_key(&self) -> i32 {
        if self.is_capture {
            self.capture_score
        } else {
            0
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture { "x" } else { "-" };
        write!(f, "{}{}{}", self.from, sep, self.to)
    }
}

/// What a square means for a mover of `color`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Quiet,
    Capture,
    Invalid,
}

fn classify(board: &Board, sq: Square, color: Color) -> Target {
    if !board.contains(sq) {
        return Target::Invalid;
    }
    match board.get(sq) {
        None => Target::Quiet,
        Some(occupant) if occupant.color != color => Target::Capture,
        Some(_) => Target::Invalid,
    }
}

// ============================================================================
// PER-PIECE GENERATION
// ============================================================================

/// Quiet and capture destinations of a `piece` of `color` standing on `from`
pub fn pseudo_destinations(
    board: &Board,
    color: Color,
    piece: PieceType,
    from: Square,
) -> Destinations {
    let mut out = Destinations::default();
    let spec = movement(piece);

    match spec {
        MovementSpec::FixedLeap(vectors) => {
            for &v in vectors.iter() {
                leap(board, color, from, v, &mut out);
            }
        }
        MovementSpec::CompoundLeap(legs) => {
            for &(a, b) in legs.iter() {
                leap(board, color, from, sum(a, b), &mut out);
            }
        }
        MovementSpec::UnlimitedSlide(vectors) => {
            for &v in vectors.iter() {
                slide(board, color, from, v, false, &mut out);
            }
        }
        MovementSpec::SpecialSlideWithJump { vectors, .. } => {
            let may_jump = spec.allows_jump(piece, color);
            for &v in vectors.iter() {
                slide(board, color, from, v, may_jump, &mut out);
            }
        }
    }

    out
}

fn record(target: Target, sq: Square, out: &mut Destinations) {
    match target {
        Target::Quiet => out.quiet.push(sq),
        Target::Capture => out.captures.push(sq),
        Target::Invalid => {}
    }
}

fn leap(board: &Board, color: Color, from: Square, v: Vector, out: &mut Destinations) {
    let (drow, dcol) = board_delta(v, color);
    let to = from.offset(drow, dcol);
    record(classify(board, to, color), to, out);
}

fn slide(
    board: &Board,
    color: Color,
    from: Square,
    v: Vector,
    may_jump: bool,
    out: &mut Destinations,
) {
    let (drow, dcol) = board_delta(v, color);
    let mut current = from;

    loop {
        current = current.offset(drow, dcol);
        match classify(board, current, color) {
            Target::Quiet => out.quiet.push(current),
            Target::Capture => {
                out.captures.push(current);
                if may_jump {
                    // One hop past the first capture, then stop
                    let beyond = current.offset(drow, dcol);
                    record(classify(board, beyond, color), beyond, out);
                }
                break;
            }
            Target::Invalid => break, // Edge or own piece
        }
    }
}

// ============================================================================
// WHOLE-BOARD GENERATION
// ============================================================================

/// Ordering score for capturing whatever stands on `to`. Codes past the
/// movement table still count by their raw index, so large codes can
/// sort below quiet moves.
pub fn capture_score(board: &Board, to: Square) -> i32 {
    match board.get(to) {
        Some(piece) => CAPTURE_BASE_SCORE + (6 - i32::from(piece.code)) * CAPTURE_INDEX_STEP,
        None => UNKNOWN_CAPTURE_SCORE,
    }
}

/// Append the moves of one piece: quiet first, then captures
pub(crate) fn push_piece_moves(
    board: &Board,
    color: Color,
    piece: PieceType,
    from: Square,
    moves: &mut Vec<Move>,
) {
    let dests = pseudo_destinations(board, color, piece, from);

    moves.extend(dests.quiet.iter().map(|&to| Move {
        from,
        to,
        piece,
        color,
        is_capture: false,
        capture_score: 0,
    }));
    moves.extend(dests.captures.iter().map(|&to| Move {
        from,
        to,
        piece,
        color,
        is_capture: true,
        capture_score: capture_score(board, to),
    }));
}

/// Every pseudo-legal move for `color`, best-looking captures first.
///
/// Pieces with reserved or unknown type indices are skipped. The sort is
/// stable, so equal keys keep row-major, quiet-before-capture order.
pub fn generate_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();

    for (sq, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        let Some(kind) = piece.kind() else {
            continue;
        };
        push_piece_moves(board, color, kind, sq, &mut moves);
    }

    moves.sort_by_key(|mv| Reverse(mv.ordering_key()));
    moves
}

/// Pseudo-legal captures only, in the same order as `generate_moves`
pub fn generate_captures(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = generate_moves(board, color);
    moves.retain(|mv| mv.is_capture);
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;

    fn board(text: &str) -> Board {
        Board::from_text(text).unwrap()
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn sorted(mut squares: Vec<Square>) -> Vec<Square> {
        squares.sort();
        squares
    }

    const EMPTY_8: &str = "
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
        . . . . . . . .
    ";

    fn with_pieces(pieces: &[(&str, &str)]) -> Board {
        let mut b = board(EMPTY_8);
        for &(at, token) in pieces {
            b.set(sq(at), Some(token.parse::<Piece>().unwrap()));
        }
        b
    }

    #[test]
    fn test_pawn_moves_diagonally_forward() {
        let b = with_pieces(&[("d4", "w0"), ("c5", "b3"), ("e5", "w0")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Pawn, sq("d4"));
        assert!(d.quiet.is_empty());
        assert_eq!(d.captures, vec![sq("c5")]);

        let d = pseudo_destinations(&b, Color::Black, PieceType::Pawn, sq("c5"));
        assert_eq!(sorted(d.quiet), sorted(vec![sq("b4")]));
        assert_eq!(d.captures, vec![sq("d4")]);
    }

    #[test]
    fn test_king_steps_everywhere_but_edges() {
        let b = with_pieces(&[("a1", "w1")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::King, sq("a1"));
        assert_eq!(sorted(d.quiet), sorted(vec![sq("a2"), sq("b2"), sq("b1")]));
    }

    #[test]
    fn test_knight_leaps_over_pieces() {
        let b = with_pieces(&[
            ("d4", "w2"),
            ("d5", "b0"),
            ("e5", "b0"),
            ("c4", "w0"),
            ("f6", "b5"),
            ("b4", "w0"),
        ]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Knight, sq("d4"));
        assert_eq!(
            sorted(d.quiet),
            sorted(vec![sq("f4"), sq("d6"), sq("d2"), sq("b6"), sq("b2"), sq("f2")])
        );
        assert_eq!(d.captures, vec![sq("f6")]);
    }

    #[test]
    fn test_bishop_slide_stops_at_first_piece() {
        let b = with_pieces(&[("c1", "w3"), ("e3", "b0"), ("f4", "b5"), ("b2", "w0")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Bishop, sq("c1"));
        assert_eq!(d.quiet, vec![sq("d2")]);
        assert_eq!(d.captures, vec![sq("e3")]);
    }

    #[test]
    fn test_white_rook_hops_one_square_past_capture() {
        let b = with_pieces(&[("a1", "w4"), ("a4", "b0"), ("a6", "b0")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Rook, sq("a1"));
        // Forward file: a2, a3 quiet, a4 captured, then one hop to a5
        assert!(d.quiet.contains(&sq("a2")));
        assert!(d.quiet.contains(&sq("a3")));
        assert!(d.quiet.contains(&sq("a5")));
        assert!(!d.quiet.contains(&sq("a6")));
        assert_eq!(d.captures.iter().filter(|s| s.col == 0).count(), 1);
    }

    #[test]
    fn test_white_rook_hop_can_capture_second_piece() {
        let b = with_pieces(&[("a1", "w4"), ("a4", "b0"), ("a5", "b2")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Rook, sq("a1"));
        assert!(d.captures.contains(&sq("a4")));
        assert!(d.captures.contains(&sq("a5")));
    }

    #[test]
    fn test_white_rook_hop_blocked_by_own_piece() {
        let b = with_pieces(&[("a1", "w4"), ("a4", "b0"), ("a5", "w0")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Rook, sq("a1"));
        assert!(!d.quiet.contains(&sq("a5")));
        assert!(!d.captures.contains(&sq("a5")));
    }

    #[test]
    fn test_black_rook_does_not_hop() {
        let b = with_pieces(&[("a8", "b4"), ("a5", "w0")]);
        let d = pseudo_destinations(&b, Color::Black, PieceType::Rook, sq("a8"));
        assert_eq!(d.captures, vec![sq("a5")]);
        assert!(!d.quiet.contains(&sq("a4")));
    }

    #[test]
    fn test_rook_hop_needs_a_capture_first() {
        let b = with_pieces(&[("a1", "w4"), ("a3", "w0")]);
        let d = pseudo_destinations(&b, Color::White, PieceType::Rook, sq("a1"));
        assert!(d.quiet.contains(&sq("a2")));
        assert!(!d.quiet.contains(&sq("a4")));
    }

    #[test]
    fn test_ragged_rows_guarded() {
        let b = Board::from_json(r#"[[null, null, null], [null], ["w5", null, null]]"#).unwrap();
        let d = pseudo_destinations(&b, Color::White, PieceType::Queen, Square::new(2, 0));
        // Row 1 only has column 0, so the diagonal stops immediately
        assert!(d.quiet.contains(&Square::new(1, 0)));
        assert!(d.quiet.contains(&Square::new(0, 0)));
        assert!(!d.quiet.contains(&Square::new(1, 1)));
        assert!(!d.quiet.contains(&Square::new(0, 2)));
        assert!(d.quiet.contains(&Square::new(2, 2)));
    }

    #[test]
    fn test_captures_ordered_by_victim() {
        let b = with_pieces(&[
            ("d4", "w5"),
            ("d6", "b0"),
            ("f4", "b1"),
            ("b4", "b4"),
            ("h1", "w1"),
        ]);
        let moves = generate_moves(&b, Color::White);
        let captures: Vec<_> = moves.iter().take_while(|m| m.is_capture).collect();
        assert_eq!(captures.len(), 3);
        assert_eq!(captures[0].to, sq("d6"));
        assert_eq!(captures[0].capture_score, 168);
        assert_eq!(captures[1].to, sq("f4"));
        assert_eq!(captures[1].capture_score, 160);
        assert_eq!(captures[2].to, sq("b4"));
        assert_eq!(captures[2].capture_score, 136);
        assert!(moves[3..].iter().all(|m| !m.is_capture));
    }

    #[test]
    fn test_reserved_victims_scored_by_code() {
        let b = with_pieces(&[("d4", "w1"), ("d5", "b9"), ("e5", "b6")]);
        let moves = generate_captures(&b, Color::White);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].to, sq("e5"));
        assert_eq!(moves[0].capture_score, 120);
        assert_eq!(moves[1].to, sq("d5"));
        assert_eq!(moves[1].capture_score, 96);

        assert_eq!(capture_score(&b, sq("d3")), UNKNOWN_CAPTURE_SCORE);
    }

    #[test]
    fn test_reserved_pieces_skipped() {
        let b = with_pieces(&[("d4", "w7"), ("e4", "w6")]);
        assert!(generate_moves(&b, Color::White).is_empty());
    }

    #[test]
    fn test_standard_opening_moves() {
        let b = Board::standard();
        let moves = generate_moves(&b, Color::White);
        assert!(moves.iter().all(|m| !m.is_capture));
        // 14 pawn diagonals + 2 knight leaps each
        let pawn_moves = moves.iter().filter(|m| m.piece == PieceType::Pawn).count();
        let knight_moves = moves.iter().filter(|m| m.piece == PieceType::Knight).count();
        assert_eq!(pawn_moves, 14);
        assert_eq!(knight_moves, 4);
        assert_eq!(moves.len(), 18);
    }

    #[test]
    fn test_stable_order_for_quiet_moves() {
        let b = Board::standard();
        let moves = generate_moves(&b, Color::White);
        let froms: Vec<_> = moves.iter().map(|m| (m.from.row, m.from.col)).collect();
        let mut expected = froms.clone();
        expected.sort();
        assert_eq!(froms, expected);
    }
}
