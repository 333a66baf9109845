//! Piece types endpoint
//!
//! Returns the movement rule table for the UI.

use axum::Json;
use serde::Serialize;

use vantage_core::{Color, Heuristics, PieceType, Vector, PIECE_TYPES};

/// Piece type info for the UI
#[derive(Serialize)]
pub struct PieceTypeInfo {
    pub index: u8,
    pub name: &'static str,
    pub move_type: &'static str,
    /// Net vectors in the white-forward frame
    pub vectors: Vec<Vector>,
    /// Colours allowed to hop one square past a capture
    pub jumps_for: Vec<Color>,
    pub value: f32,
    pub is_king: bool,
}

/// Get all piece type definitions
pub async fn get_pieces() -> Json<Vec<PieceTypeInfo>> {
    let values = Heuristics::default().piece_values;

    let pieces = PIECE_TYPES
        .iter()
        .map(|&kind| {
            let spec = kind.movement();
            PieceTypeInfo {
                index: kind.index(),
                name: kind.name(),
                move_type: spec.kind_name(),
                vectors: spec.vectors(),
                jumps_for: [Color::White, Color::Black]
                    .into_iter()
                    .filter(|&color| spec.allows_jump(kind, color))
                    .collect(),
                value: values[kind.index() as usize],
                is_king: kind == PieceType::King,
            }
        })
        .collect();

    Json(pieces)
}
