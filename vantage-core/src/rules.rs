//! Legality filter: attacks, check, checkmate and stalemate
//!
//! A move is legal when the mover's own king is not attacked on the board
//! that results from it. A colour without a king counts as permanently in
//! check, so it has no legal moves and is checkmated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, Color, Square};
use crate::movegen::{generate_moves, pseudo_destinations, push_piece_moves, Move};

/// Game state from the point of view of the side to move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Ongoing => "ongoing",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
        };
        f.write_str(s)
    }
}

// ============================================================================
// ATTACKS AND CHECK
// ============================================================================

/// Whether any `by` piece has `target` among its pseudo-legal captures
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == by)
        .filter_map(|(sq, piece)| piece.kind().map(|kind| (sq, kind)))
        .any(|(sq, kind)| {
            pseudo_destinations(board, by, kind, sq)
                .captures
                .contains(&target)
        })
}

/// Whether `color`'s king is attacked (true when it has no king)
pub fn in_check(board: &Board, color: Color) -> bool {
    match board.find_king(color) {
        Some(king) => is_square_attacked(board, king, color.opponent()),
        None => true,
    }
}

/// Whether a generated move keeps the mover's king safe
pub fn is_legal(board: &Board, mv: &Move) -> bool {
    !in_check(&board.apply_move(mv), mv.color)
}

// ============================================================================
// LEGAL MOVES
// ============================================================================

/// Whether `color` has at least one move that does not leave it in check
pub fn has_legal_moves(board: &Board, color: Color) -> bool {
    board
        .pieces()
        .filter(|(_, piece)| piece.color == color)
        .filter_map(|(from, piece)| piece.kind().map(|kind| (from, kind)))
        .any(|(from, kind)| {
            pseudo_destinations(board, color, kind, from)
                .all()
                .any(|to| !in_check(&board.move_piece(from, to), color))
        })
}

/// Legal moves for `color`, in search order (best captures first)
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = generate_moves(board, color);
    moves.retain(|mv| is_legal(board, mv));
    moves
}

/// Legal moves of the piece on `from` (empty if there is none)
pub fn legal_moves_from(board: &Board, from: Square) -> Vec<Move> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let Some(kind) = piece.kind() else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    push_piece_moves(board, piece.color, kind, from, &mut moves);
    moves.retain(|mv| is_legal(board, mv));
    moves
}

// ============================================================================
// GAME STATUS
// ============================================================================

/// In check with no legal move. A missing king is checkmate.
pub fn is_checkmate(board: &Board, color: Color) -> bool {
    in_check(board, color) && !has_legal_moves(board, color)
}

/// Not in check, but no legal move
pub fn is_stalemate(board: &Board, color: Color) -> bool {
    !in_check(board, color) && !has_legal_moves(board, color)
}

/// Status of `color` as the side to move
pub fn status(board: &Board, color: Color) -> GameStatus {
    let checked = in_check(board, color);
    match (checked, has_legal_moves(board, color)) {
        (true, false) => GameStatus::Checkmate,
        (false, false) => GameStatus::Stalemate,
        (true, true) => GameStatus::Check,
        (false, true) => GameStatus::Ongoing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Piece;
    use crate::pieces::PieceType;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    fn with_pieces(pieces: &[(&str, &str)]) -> Board {
        let mut b = Board::empty(8, 8);
        for &(at, token) in pieces {
            b.set(sq(at), Some(token.parse::<Piece>().unwrap()));
        }
        b
    }

    /// Random sparse position with one king per side
    fn random_board(rng: &mut ChaCha8Rng) -> Board {
        let mut b = Board::empty(8, 8);
        let mut free: Vec<Square> = (0..8)
            .flat_map(|r| (0..8).map(move |c| Square::new(r, c)))
            .collect();
        free.shuffle(rng);

        b.set(free.pop().unwrap(), Some(Piece::new(Color::White, PieceType::King)));
        b.set(free.pop().unwrap(), Some(Piece::new(Color::Black, PieceType::King)));

        let extras = rng.gen_range(2..10);
        for _ in 0..extras {
            let color = if rng.gen_bool(0.5) { Color::White } else { Color::Black };
            let kind = [
                PieceType::Pawn,
                PieceType::Knight,
                PieceType::Bishop,
                PieceType::Rook,
                PieceType::Queen,
            ][rng.gen_range(0..5)];
            b.set(free.pop().unwrap(), Some(Piece::new(color, kind)));
        }
        b
    }

    #[test]
    fn test_cornered_king_checkmated_by_queen() {
        // White king h1, black queen g2 defended by the black king on f3
        let b = with_pieces(&[("h1", "w1"), ("g2", "b5"), ("f3", "b1")]);
        assert!(in_check(&b, Color::White));
        assert!(!has_legal_moves(&b, Color::White));
        assert!(is_checkmate(&b, Color::White));
        assert_eq!(status(&b, Color::White), GameStatus::Checkmate);
        assert!(legal_moves(&b, Color::White).is_empty());
    }

    #[test]
    fn test_undefended_queen_can_be_taken() {
        let b = with_pieces(&[("h1", "w1"), ("g2", "b5"), ("a8", "b1")]);
        assert!(in_check(&b, Color::White));
        assert!(!is_checkmate(&b, Color::White));
        let moves = legal_moves(&b, Color::White);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, sq("g2"));
        assert!(moves[0].is_capture);
    }

    #[test]
    fn test_two_kings_not_checkmate() {
        let b = with_pieces(&[("e1", "w1"), ("e8", "b1")]);
        for color in [Color::White, Color::Black] {
            assert!(!in_check(&b, color));
            assert!(!is_checkmate(&b, color));
            assert!(!legal_moves(&b, color).is_empty());
            assert_eq!(status(&b, color), GameStatus::Ongoing);
        }
    }

    #[test]
    fn test_stalemate() {
        // Black king a8 boxed in by a white queen on b6, not in check
        let b = with_pieces(&[("a8", "b1"), ("b6", "w5"), ("h1", "w1")]);
        assert!(!in_check(&b, Color::Black));
        assert!(!has_legal_moves(&b, Color::Black));
        assert!(is_stalemate(&b, Color::Black));
        assert!(!is_checkmate(&b, Color::Black));
        assert_eq!(status(&b, Color::Black), GameStatus::Stalemate);
    }

    #[test]
    fn test_missing_king_is_checkmate() {
        let b = with_pieces(&[("e1", "w1"), ("e8", "b5")]);
        assert!(in_check(&b, Color::Black));
        assert!(!has_legal_moves(&b, Color::Black));
        assert!(is_checkmate(&b, Color::Black));
    }

    #[test]
    fn test_pinned_piece_cannot_expose_king() {
        // Pawn on e2 shields the king from the queen on e8 and can only
        // step off the file
        let b = with_pieces(&[("e1", "w1"), ("e2", "w0"), ("e8", "b5"), ("a8", "b1")]);
        assert!(!in_check(&b, Color::White));
        assert_eq!(
            crate::movegen::pseudo_destinations(&b, Color::White, PieceType::Pawn, sq("e2"))
                .quiet
                .len(),
            2
        );
        assert!(legal_moves_from(&b, sq("e2")).is_empty());
        assert!(!legal_moves(&b, Color::White).is_empty());
    }

    #[test]
    fn test_pawn_attacks_diagonally_forward_only() {
        let b = with_pieces(&[("d4", "w0"), ("e5", "b1"), ("c3", "b0")]);
        assert!(is_square_attacked(&b, sq("e5"), Color::White));
        assert!(!probe_attack(&b, sq("e3"), Color::White));
        // Black pawns point down the board
        assert!(probe_attack(&b, sq("d2"), Color::Black));
        assert!(!probe_attack(&b, sq("b4"), Color::Black));
    }

    /// Captures only exist onto enemy pieces, so drop one on the target first
    fn probe_attack(board: &Board, target: Square, by: Color) -> bool {
        let mut probe = board.clone();
        probe.set(target, Some(Piece::new(by.opponent(), PieceType::Pawn)));
        is_square_attacked(&probe, target, by)
    }

    #[test]
    fn test_legal_moves_never_leave_king_attacked() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let b = random_board(&mut rng);
            for color in [Color::White, Color::Black] {
                for mv in legal_moves(&b, color) {
                    let next = b.apply_move(&mv);
                    let king = next.find_king(color).expect("king survives a legal move");
                    assert!(
                        !is_square_attacked(&next, king, color.opponent()),
                        "{} leaves {} king attacked on\n{}",
                        mv,
                        color,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_checkmate_iff_check_and_no_legal_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let b = random_board(&mut rng);
            for color in [Color::White, Color::Black] {
                let expected = in_check(&b, color) && legal_moves(&b, color).is_empty();
                assert_eq!(is_checkmate(&b, color), expected, "on\n{}", b);
                assert_eq!(has_legal_moves(&b, color), !legal_moves(&b, color).is_empty());
            }
        }
    }

    #[test]
    fn test_mirror_symmetry_of_pseudo_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let last = 7;
        for _ in 0..100 {
            let b = random_board(&mut rng);
            let m = b.mirrored();
            for (from, piece) in b.pieces() {
                let Some(kind) = piece.kind() else { continue };
                let flip = |s: Square| Square::new(last - s.row, s.col);
                let original = pseudo_destinations(&b, piece.color, kind, from);
                // Only the white rook hops past a capture, and the mirrored
                // rook has the same captures, so a rook without captures
                // must mirror exactly
                if kind == PieceType::Rook && !original.captures.is_empty() {
                    continue;
                }
                let mirrored = pseudo_destinations(&m, piece.color.opponent(), kind, flip(from));

                let mut expected_quiet: Vec<_> = original.quiet.iter().map(|&s| flip(s)).collect();
                let mut expected_caps: Vec<_> = original.captures.iter().map(|&s| flip(s)).collect();
                let mut got_quiet = mirrored.quiet.clone();
                let mut got_caps = mirrored.captures.clone();
                expected_quiet.sort();
                expected_caps.sort();
                got_quiet.sort();
                got_caps.sort();
                assert_eq!(got_quiet, expected_quiet);
                assert_eq!(got_caps, expected_caps);
            }
        }
    }

    #[test]
    fn test_black_rook_mirrors_white_rook_without_capture() {
        let b = with_pieces(&[("a1", "w4"), ("a3", "w0"), ("h8", "b1"), ("h1", "w1")]);
        let m = b.mirrored();
        let white = pseudo_destinations(&b, Color::White, PieceType::Rook, sq("a1"));
        let black = pseudo_destinations(&m, Color::Black, PieceType::Rook, sq("a8"));
        assert_eq!(white.quiet.len(), black.quiet.len());
        assert_eq!(white.captures.len(), black.captures.len());
    }
}
