//! Board input shared by the analysis commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use vantage_core::{Board, Color};

#[derive(Args, Clone, Debug)]
pub struct BoardArgs {
    /// Board file: JSON rows of tokens, or a text diagram ("." for empty).
    /// Defaults to the standard start position.
    #[arg(long, value_name = "FILE")]
    pub board: Option<PathBuf>,

    /// Colour to analyse (w or b)
    #[arg(long, default_value = "w")]
    pub color: Color,
}

impl BoardArgs {
    pub fn load(&self) -> Result<Board> {
        match &self.board {
            Some(path) => load_board(path),
            None => Ok(Board::standard()),
        }
    }
}

/// Load a board, picking the format from the content
pub fn load_board(path: &Path) -> Result<Board> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read board file: {}", path.display()))?;
    parse_board(&content).with_context(|| format!("Failed to parse board file: {}", path.display()))
}

pub fn parse_board(content: &str) -> Result<Board> {
    let board = if content.trim_start().starts_with('[') {
        Board::from_json(content)?
    } else {
        Board::from_text(content)?
    };
    Ok(board)
}
