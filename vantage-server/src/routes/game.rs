//! Game API routes
//!
//! A game is a `GameSession` held by the server. Handlers copy it out,
//! work on the copy (searching on the blocking pool where needed) and
//! write it back only if nobody else moved in the meantime.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use vantage_core::{Board, CapturedPiece, Color, GameSession, GameStatus, MoveOutcome, Piece};

use super::{ApiError, ApiResult, MoveView, SquareInput};
use crate::state::{HostedGame, ServerState};

// ============================================================================
// VIEWS
// ============================================================================

/// Snapshot of a hosted game
#[derive(Serialize)]
pub struct GameView {
    pub id: String,
    pub board: Board,
    pub to_move: Color,
    pub player_color: Color,
    pub status: GameStatus,
    pub winner: Option<Color>,
    pub captured: Vec<CapturedPiece>,
    pub last_move: Option<MoveView>,
    pub plies: usize,
}

impl GameView {
    fn new(id: &str, game: &HostedGame) -> Self {
        let session = &game.session;
        Self {
            id: id.to_string(),
            board: session.board().clone(),
            to_move: session.to_move(),
            player_color: game.player_color,
            status: session.status(),
            winner: session.winner(),
            captured: session.captured().to_vec(),
            last_move: session.last_move().copied().map(MoveView::from),
            plies: session.history().len(),
        }
    }
}

#[derive(Serialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    pub mv: MoveView,
    pub captured: Option<Piece>,
    pub opponent_status: GameStatus,
    pub game: GameView,
}

impl MoveResponse {
    fn new(outcome: MoveOutcome, game: GameView) -> Self {
        Self {
            mv: outcome.mv.into(),
            captured: outcome.captured,
            opponent_status: outcome.opponent_status,
            game,
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Start request; every field is optional
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct StartRequest {
    pub board: Option<Board>,
    pub to_move: Option<Color>,
    pub player_color: Option<Color>,
    pub depth: Option<i32>,
    pub time_limit_ms: Option<u64>,
}

pub async fn start_game(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<StartRequest>,
) -> ApiResult<GameView> {
    let session = GameSession::new(
        req.board.unwrap_or_default(),
        req.to_move.unwrap_or(Color::White),
    );
    let game = HostedGame {
        session,
        player_color: req.player_color.unwrap_or(Color::White),
        limits: state.limits(req.depth, req.time_limit_ms),
    };

    let id = state.insert_game(game.clone());
    tracing::info!(
        id = %id,
        player = %game.player_color,
        depth = game.limits.clamped_depth(),
        "game started"
    );

    Ok(Json(GameView::new(&id, &game)))
}

pub async fn get_game(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<GameView> {
    let game = find_game(&state, &id)?;
    Ok(Json(GameView::new(&id, &game)))
}

#[derive(Deserialize)]
pub struct PlayerMoveRequest {
    pub from: SquareInput,
    pub to: SquareInput,
}

pub async fn make_player_move(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    Json(req): Json<PlayerMoveRequest>,
) -> ApiResult<MoveResponse> {
    let mut game = find_game(&state, &id)?;
    let base_plies = game.session.history().len();
    if !game.session.status().is_over() && game.session.to_move() != game.player_color {
        return Err(ApiError::conflict(format!(
            "it is the engine's turn; the player is {}",
            game.player_color
        )));
    }

    let outcome = game.session.play(req.from.resolve()?, req.to.resolve()?)?;
    commit(&state, &id, base_plies, &game)?;

    Ok(Json(MoveResponse::new(outcome, GameView::new(&id, &game))))
}

pub async fn make_ai_move(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ApiResult<MoveResponse> {
    let game = find_game(&state, &id)?;
    let base_plies = game.session.history().len();
    if !game.session.status().is_over() && game.session.to_move() == game.player_color {
        return Err(ApiError::conflict(format!(
            "it is the player's turn; the engine plays {}",
            game.player_color.opponent()
        )));
    }

    let (game, outcome) = tokio::task::spawn_blocking(move || {
        let mut game = game;
        let ai = game.ai();
        let outcome = game.session.play_engine(&ai);
        (game, outcome)
    })
    .await
    .map_err(|e| ApiError::internal(format!("search task failed: {}", e)))?;

    let outcome = outcome?.ok_or_else(|| ApiError::conflict("no legal move for the engine"))?;
    commit(&state, &id, base_plies, &game)?;

    Ok(Json(MoveResponse::new(outcome, GameView::new(&id, &game))))
}

// ============================================================================
// HELPERS
// ============================================================================

fn find_game(state: &ServerState, id: &str) -> Result<HostedGame, ApiError> {
    state
        .game(id)
        .ok_or_else(|| ApiError::not_found(format!("Game not found: {}", id)))
}

fn commit(state: &ServerState, id: &str, base_plies: usize, game: &HostedGame) -> Result<(), ApiError> {
    match state.update_game(id, base_plies, game.clone()) {
        Some(true) => Ok(()),
        Some(false) => Err(ApiError::conflict("game changed while the move was being made")),
        None => Err(ApiError::not_found(format!("Game not found: {}", id))),
    }
}
