//! HTTP route handlers

pub mod analysis;
pub mod game;
pub mod pieces;
pub mod status;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use vantage_core::{Move, Square};

/// Handler failure, rendered as `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<vantage_core::Error> for ApiError {
    fn from(err: vantage_core::Error) -> Self {
        let status = match &err {
            vantage_core::Error::GameOver(_) => StatusCode::CONFLICT,
            vantage_core::Error::NoPiece { .. } | vantage_core::Error::IllegalMove { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// A square given either as notation (`"e2"`) or as `{"row": 6, "col": 4}`
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum SquareInput {
    Notation(String),
    Coords(Square),
}

impl SquareInput {
    pub fn resolve(&self) -> Result<Square, ApiError> {
        match self {
            SquareInput::Notation(s) => Ok(s.parse()?),
            SquareInput::Coords(sq) => Ok(*sq),
        }
    }
}

/// A move plus its notation, for UIs that don't want to format squares
#[derive(Clone, Debug, Serialize)]
pub struct MoveView {
    #[serde(flatten)]
    pub mv: Move,
    pub notation: String,
}

impl From<Move> for MoveView {
    fn from(mv: Move) -> Self {
        Self {
            notation: mv.to_string(),
            mv,
        }
    }
}
