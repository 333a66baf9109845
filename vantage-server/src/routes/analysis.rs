//! Stateless analysis endpoints
//!
//! Each request carries its own board; nothing is stored.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use vantage_core::rules::{self, legal_moves_from};
use vantage_core::{AlphaBetaAI, Board, Color, GameStatus, SearchReport};

use super::{ApiError, ApiResult, MoveView, SquareInput};
use crate::state::ServerState;

// ============================================================================
// LEGAL MOVES
// ============================================================================

#[derive(Deserialize)]
pub struct MovesRequest {
    pub board: Board,
    pub color: Color,
    /// Restrict to the piece on this square
    pub from: Option<SquareInput>,
}

#[derive(Serialize)]
pub struct MovesResponse {
    pub color: Color,
    pub count: usize,
    pub moves: Vec<MoveView>,
}

pub async fn legal_moves(Json(req): Json<MovesRequest>) -> ApiResult<MovesResponse> {
    let moves = match &req.from {
        Some(from) => {
            let from = from.resolve()?;
            legal_moves_from(&req.board, from)
                .into_iter()
                .filter(|mv| mv.color == req.color)
                .collect()
        }
        None => rules::legal_moves(&req.board, req.color),
    };

    Ok(Json(MovesResponse {
        color: req.color,
        count: moves.len(),
        moves: moves.into_iter().map(MoveView::from).collect(),
    }))
}

// ============================================================================
// CHECK STATUS
// ============================================================================

#[derive(Deserialize)]
pub struct CheckRequest {
    pub board: Board,
    pub color: Color,
}

#[derive(Serialize)]
pub struct CheckResponse {
    pub color: Color,
    pub in_check: bool,
    pub checkmate: bool,
    pub stalemate: bool,
    pub status: GameStatus,
}

pub async fn check_status(Json(req): Json<CheckRequest>) -> ApiResult<CheckResponse> {
    let status = rules::status(&req.board, req.color);

    Ok(Json(CheckResponse {
        color: req.color,
        in_check: rules::in_check(&req.board, req.color),
        checkmate: status == GameStatus::Checkmate,
        stalemate: status == GameStatus::Stalemate,
        status,
    }))
}

// ============================================================================
// BEST MOVE
// ============================================================================

#[derive(Deserialize)]
pub struct BestMoveRequest {
    pub board: Board,
    pub color: Color,
    pub depth: Option<i32>,
    pub time_limit_ms: Option<u64>,
}

#[derive(Serialize)]
pub struct BestMoveResponse {
    pub best_move: Option<MoveView>,
    pub score: f32,
    pub depth_reached: i32,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub timed_out: bool,
}

impl From<SearchReport> for BestMoveResponse {
    fn from(report: SearchReport) -> Self {
        Self {
            best_move: report.best_move.map(MoveView::from),
            score: report.score,
            depth_reached: report.depth_reached,
            nodes: report.nodes,
            elapsed_ms: report.elapsed_ms,
            timed_out: report.timed_out,
        }
    }
}

pub async fn best_move(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<BestMoveRequest>,
) -> ApiResult<BestMoveResponse> {
    let ai = AlphaBetaAI {
        limits: state.limits(req.depth, req.time_limit_ms),
        ..AlphaBetaAI::default()
    };

    let report = run_search(ai, req.board, req.color).await?;
    tracing::debug!(
        depth = report.depth_reached,
        nodes = report.nodes,
        timed_out = report.timed_out,
        "best-move search finished"
    );

    Ok(Json(report.into()))
}

/// Run a search on the blocking pool
pub(crate) async fn run_search(ai: AlphaBetaAI, board: Board, color: Color) -> Result<SearchReport, ApiError> {
    tokio::task::spawn_blocking(move || ai.search(&board, color))
        .await
        .map_err(|e| ApiError::internal(format!("search task failed: {}", e)))
}
