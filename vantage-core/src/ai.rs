//! CPU-based Alpha-Beta AI

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Color};
use crate::error::Result;
use crate::eval::{evaluate_with, Heuristics, WIN_VALUE};
use crate::movegen::{generate_captures, generate_moves, Move};
use crate::rules::{in_check, legal_moves};
use crate::session::GameSession;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Shallowest search the engine will run
pub const MIN_DEPTH: i32 = 1;

/// Deepest search the engine will run
pub const MAX_DEPTH: i32 = 10;

/// Depth used when the caller does not pick one
pub const DEFAULT_DEPTH: i32 = 2;

// ============================================================================
// RESULTS AND LIMITS
// ============================================================================

/// Score of a searched node plus the move that achieved it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    pub score: f32,
    pub best_move: Option<Move>,
}

/// How long and how deep a search may go
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchLimits {
    pub depth: i32,
    pub time_limit: Option<Duration>,
}

impl SearchLimits {
    pub fn depth(depth: i32) -> Self {
        Self {
            depth,
            time_limit: None,
        }
    }

    pub fn clamped_depth(&self) -> i32 {
        self.depth.clamp(MIN_DEPTH, MAX_DEPTH)
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(DEFAULT_DEPTH)
    }
}

/// Best-move-so-far, reported after each completed iteration
#[derive(Clone, Copy, Debug)]
pub struct SearchProgress {
    pub depth: i32,
    pub score: f32,
    pub best_move: Option<Move>,
    pub nodes: u64,
    pub elapsed: Duration,
}

/// Outcome of a full search invocation
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SearchReport {
    pub best_move: Option<Move>,
    pub score: f32,
    /// Deepest fully completed iteration, 0 if none completed
    pub depth_reached: i32,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub timed_out: bool,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
#[derive(Clone, Debug, Default)]
pub struct AlphaBetaAI {
    pub limits: SearchLimits,
    pub heuristics: Heuristics,
}

impl AlphaBetaAI {
    pub fn new(depth: i32) -> Self {
        Self {
            limits: SearchLimits::depth(depth),
            heuristics: Heuristics::default(),
        }
    }

    pub fn with_heuristics(mut self, heuristics: Heuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.limits.time_limit = Some(time_limit);
        self
    }

    /// Get best move for `color` (None when it has no legal move)
    pub fn best_move(&self, board: &Board, color: Color) -> Option<Move> {
        self.search(board, color).best_move
    }

    pub fn search(&self, board: &Board, color: Color) -> SearchReport {
        self.search_with_progress(board, color, |_| {})
    }

    /// Run the search, calling `on_progress` after every completed depth.
    ///
    /// Without a time limit this is a single search at the clamped depth.
    /// With one, depths `1..=depth` are searched in turn until the deadline
    /// passes; an interrupted iteration is thrown away, except that at
    /// depth 1 its fully searched root moves still beat a blind guess.
    pub fn search_with_progress<F>(&self, board: &Board, color: Color, mut on_progress: F) -> SearchReport
    where
        F: FnMut(&SearchProgress),
    {
        let start = Instant::now();
        let depth = self.limits.clamped_depth();
        let deadline = self.limits.time_limit.map(|limit| start + limit);
        let first_depth = if deadline.is_some() { MIN_DEPTH } else { depth };

        let mut searcher = Searcher::new(&self.heuristics, deadline);
        let mut completed: Option<(i32, SearchResult)> = None;
        let mut partial: Option<SearchResult> = None;

        for d in first_depth..=depth {
            let result = searcher.negamax(board, color, d, f32::NEG_INFINITY, f32::INFINITY);
            if searcher.aborted {
                partial = Some(result);
                debug!(depth = d, nodes = searcher.nodes, "search interrupted by deadline");
                break;
            }

            let progress = SearchProgress {
                depth: d,
                score: result.score,
                best_move: result.best_move,
                nodes: searcher.nodes,
                elapsed: start.elapsed(),
            };
            debug!(
                depth = d,
                score = result.score,
                nodes = searcher.nodes,
                best = ?result.best_move.map(|mv| mv.to_string()),
                "iteration complete"
            );
            on_progress(&progress);
            completed = Some((d, result));

            if result.best_move.is_none() {
                // Mated or stalemated at the root; deeper search changes nothing
                break;
            }
        }

        let (depth_reached, result) = match (completed, partial) {
            (Some((d, result)), _) => (d, result),
            (None, Some(result)) if result.best_move.is_some() => (0, result),
            _ => {
                let fallback = legal_moves(board, color).into_iter().next();
                let score = evaluate_with(board, color, &self.heuristics);
                (
                    0,
                    SearchResult {
                        score,
                        best_move: fallback,
                    },
                )
            }
        };

        let report = SearchReport {
            best_move: result.best_move,
            score: result.score,
            depth_reached,
            nodes: searcher.nodes,
            elapsed_ms: start.elapsed().as_millis() as u64,
            timed_out: searcher.aborted,
        };
        debug!(
            %color,
            depth = report.depth_reached,
            nodes = report.nodes,
            score = report.score,
            elapsed_ms = report.elapsed_ms,
            timed_out = report.timed_out,
            "search finished"
        );
        report
    }

    /// Play engine moves for both sides until the game ends or
    /// `max_plies` moves have been made
    pub fn play_game(&self, mut session: GameSession, max_plies: usize) -> Result<GameSession> {
        while !session.status().is_over() && session.history().len() < max_plies {
            if session.play_engine(self)?.is_none() {
                break;
            }
        }
        Ok(session)
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board, color: Color) -> f32 {
        evaluate_with(board, color, &self.heuristics)
    }
}

// ============================================================================
// NEGAMAX WITH ALPHA-BETA
// ============================================================================

/// Per-invocation search state
struct Searcher<'a> {
    heuristics: &'a Heuristics,
    deadline: Option<Instant>,
    nodes: u64,
    aborted: bool,
}

impl<'a> Searcher<'a> {
    fn new(heuristics: &'a Heuristics, deadline: Option<Instant>) -> Self {
        Self {
            heuristics,
            deadline,
            nodes: 0,
            aborted: false,
        }
    }

    fn out_of_time(&mut self) -> bool {
        if !self.aborted {
            if let Some(deadline) = self.deadline {
                self.aborted = Instant::now() >= deadline;
            }
        }
        self.aborted
    }

    fn negamax(&mut self, board: &Board, color: Color, depth: i32, mut alpha: f32, beta: f32) -> SearchResult {
        self.nodes += 1;
        if self.out_of_time() {
            return SearchResult {
                score: alpha,
                best_move: None,
            };
        }

        if depth <= 0 {
            return SearchResult {
                score: self.quiescence(board, color, alpha, beta),
                best_move: None,
            };
        }

        let mut best = SearchResult {
            score: f32::NEG_INFINITY,
            best_move: None,
        };

        // Legality is filtered lazily, one move at a time
        for mv in generate_moves(board, color) {
            let child = board.apply_move(&mv);
            if in_check(&child, color) {
                continue;
            }

            let score = -self.negamax(&child, color.opponent(), depth - 1, -beta, -alpha).score;
            if self.aborted {
                break;
            }

            if score > best.score {
                best = SearchResult {
                    score,
                    best_move: Some(mv),
                };
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }

        if best.best_move.is_none() && !self.aborted {
            best.score = if in_check(board, color) { -WIN_VALUE } else { 0.0 };
        }

        best
    }

    /// Capture-only extension at the horizon. Returns the raised alpha
    /// rather than a separately tracked best score.
    fn quiescence(&mut self, board: &Board, color: Color, mut alpha: f32, beta: f32) -> f32 {
        self.nodes += 1;
        if self.out_of_time() {
            return alpha;
        }

        let stand_pat = evaluate_with(board, color, self.heuristics);
        if stand_pat >= beta {
            return beta;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        for mv in generate_captures(board, color) {
            let child = board.apply_move(&mv);
            if in_check(&child, color) {
                continue;
            }

            let score = -self.quiescence(&child, color.opponent(), -beta, -alpha);
            if self.aborted {
                break;
            }
            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }

        alpha
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Fixed-depth negamax with the standard heuristics and no deadline
pub fn negamax(board: &Board, color: Color, depth: i32, alpha: f32, beta: f32) -> SearchResult {
    let heuristics = Heuristics::default();
    Searcher::new(&heuristics, None).negamax(board, color, depth, alpha, beta)
}

/// Capture-only search with the standard heuristics
pub fn quiescence(board: &Board, color: Color, alpha: f32, beta: f32) -> f32 {
    let heuristics = Heuristics::default();
    Searcher::new(&heuristics, None).quiescence(board, color, alpha, beta)
}

/// Best move for `color`, depth clamped to `[MIN_DEPTH, MAX_DEPTH]`.
/// None when the root has no legal move.
pub fn find_best_move(board: &Board, color: Color, depth: i32) -> Option<Move> {
    let depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    negamax(board, color, depth, f32::NEG_INFINITY, f32::INFINITY).best_move
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;
    use crate::eval::evaluate;
    use crate::rules::is_checkmate;

    fn with_pieces(pieces: &[(&str, &str)]) -> Board {
        let mut b = Board::empty(8, 8);
        for &(at, token) in pieces {
            b.set(at.parse().unwrap(), Some(token.parse().unwrap()));
        }
        b
    }

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    /// White pawn on d4 can take an undefended black queen on e5
    fn hanging_queen() -> Board {
        with_pieces(&[("h1", "w1"), ("a8", "b1"), ("d4", "w0"), ("e5", "b5")])
    }

    /// Black to move; Qg2 is mate with the king on f3 guarding g2
    fn mate_in_one() -> Board {
        with_pieces(&[("h1", "w1"), ("f3", "b1"), ("g8", "b5")])
    }

    #[test]
    fn test_ai_returns_move() {
        let board = Board::standard();
        assert!(find_best_move(&board, Color::White, 1).is_some());

        let ai = AlphaBetaAI::new(2);
        let mv = ai.best_move(&board, Color::White).unwrap();
        assert!(legal_moves(&board, Color::White).contains(&mv));
    }

    #[test]
    fn test_quiescence_sees_free_queen() {
        let board = hanging_queen();
        let stand_pat = evaluate(&board, Color::White);
        let q = quiescence(&board, Color::White, f32::NEG_INFINITY, f32::INFINITY);
        assert!(q >= stand_pat + 350.0 - 1e-3, "q = {}, stand pat = {}", q, stand_pat);
    }

    #[test]
    fn test_ai_takes_hanging_queen() {
        let mv = find_best_move(&hanging_queen(), Color::White, 1).unwrap();
        assert_eq!(mv.from, sq("d4"));
        assert_eq!(mv.to, sq("e5"));
        assert!(mv.is_capture);
    }

    #[test]
    fn test_ai_finds_mate_in_one() {
        let board = mate_in_one();
        let result = negamax(&board, Color::Black, 2, f32::NEG_INFINITY, f32::INFINITY);
        let mv = result.best_move.unwrap();
        assert_eq!(result.score, WIN_VALUE);
        assert!(is_checkmate(&board.apply_move(&mv), Color::White));
    }

    #[test]
    fn test_no_move_when_mated() {
        let board = with_pieces(&[("h1", "w1"), ("g2", "b5"), ("f3", "b1")]);
        assert_eq!(find_best_move(&board, Color::White, 3), None);

        let result = negamax(&board, Color::White, 2, f32::NEG_INFINITY, f32::INFINITY);
        assert_eq!(result.score, -WIN_VALUE);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let board = with_pieces(&[("a8", "b1"), ("b6", "w5"), ("h1", "w1")]);
        let result = negamax(&board, Color::Black, 2, f32::NEG_INFINITY, f32::INFINITY);
        assert_eq!(result.best_move, None);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_depth_clamping() {
        assert_eq!(SearchLimits::depth(0).clamped_depth(), 1);
        assert_eq!(SearchLimits::depth(-5).clamped_depth(), 1);
        assert_eq!(SearchLimits::depth(99).clamped_depth(), 10);
        assert_eq!(SearchLimits::default().clamped_depth(), DEFAULT_DEPTH);

        // Depth 0 is searched as depth 1, so a move still comes back
        assert!(find_best_move(&hanging_queen(), Color::White, 0).is_some());
    }

    #[test]
    fn test_zero_time_limit_still_moves() {
        let board = Board::standard();
        let ai = AlphaBetaAI::new(4).with_time_limit(Duration::ZERO);
        let report = ai.search(&board, Color::White);

        assert!(report.timed_out);
        assert_eq!(report.depth_reached, 0);
        let mv = report.best_move.unwrap();
        assert!(legal_moves(&board, Color::White).contains(&mv));
    }

    #[test]
    fn test_progress_per_iteration() {
        let board = hanging_queen();
        let ai = AlphaBetaAI::new(3).with_time_limit(Duration::from_secs(60));

        let mut seen = Vec::new();
        let report = ai.search_with_progress(&board, Color::White, |p| seen.push(p.depth));

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(report.depth_reached, 3);
        assert!(!report.timed_out);
        assert!(report.nodes > 0);
    }

    #[test]
    fn test_deepening_matches_fixed_depth() {
        let board = Board::standard();
        let fixed = AlphaBetaAI::new(2).search(&board, Color::White);
        let timed = AlphaBetaAI::new(2)
            .with_time_limit(Duration::from_secs(60))
            .search(&board, Color::White);

        assert_eq!(fixed.best_move, timed.best_move);
        assert_eq!(fixed.score, timed.score);
    }

    /// Log sink shared between the subscriber and the test
    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_search_logs_summary() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let report = tracing::subscriber::with_default(subscriber, || {
            AlphaBetaAI::new(1).search(&hanging_queen(), Color::White)
        });

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("search finished"), "log was:\n{}", text);
        assert!(text.contains(&format!("nodes={}", report.nodes)));
        assert!(text.contains("depth=1"));
    }

    #[test]
    fn test_play_game() {
        let ai = AlphaBetaAI::new(1);
        let session = ai.play_game(GameSession::standard(), 6).unwrap();

        assert_eq!(session.history().len(), 6);
        assert_eq!(session.to_move(), Color::White);
    }
}
