//! Board model: squares, colours, pieces and immutable board snapshots
//!
//! Row 0 is Black's back rank (the far side), the last row is White's.
//! A `Board` is never changed by the engine; applying a move yields a new
//! snapshot. Cells live in one flat vector and the row-length table is
//! shared between snapshots, so a clone is a single contiguous copy.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::movegen::Move;
use crate::pieces::PieceType;

/// Side length of the standard board
pub const BOARD_SIZE: usize = 8;

/// Largest supported row count or row length (squares use i8 coordinates)
pub const MAX_DIMENSION: usize = 64;

// ============================================================================
// COLOR
// ============================================================================

/// Side colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "w")]
    White,
    #[serde(rename = "b")]
    Black,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of one step "forward" for this colour
    pub fn forward(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Single-letter code used in piece tokens
    pub fn code(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "white" => Ok(Color::White),
            "b" | "black" => Ok(Color::Black),
            other => Err(format!("unknown colour `{}` (expected w or b)", other)),
        }
    }
}

// ============================================================================
// SQUARE
// ============================================================================

/// Board coordinates. May lie off the board while walking a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Square shifted by a board-frame delta
    pub fn offset(self, drow: i8, dcol: i8) -> Square {
        Square::new(self.row.saturating_add(drow), self.col.saturating_add(dcol))
    }
}

/// Coordinate notation on the standard 8-rank board: `a8` is row 0, column 0.
impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rank = BOARD_SIZE as i8 - self.row;
        if (0..26).contains(&self.col) && (1..=BOARD_SIZE as i8).contains(&rank) {
            write!(f, "{}{}", (b'a' + self.col as u8) as char, rank)
        } else {
            write!(f, "({},{})", self.row, self.col)
        }
    }
}

impl FromStr for Square {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSquare(s.to_string());
        let mut chars = s.trim().chars();
        let file = chars.next().filter(|c| c.is_ascii_lowercase()).ok_or_else(invalid)?;
        let rank: i8 = chars.as_str().parse().map_err(|_| invalid())?;
        if !(1..=BOARD_SIZE as i8).contains(&rank) {
            return Err(invalid());
        }
        Ok(Square::new(BOARD_SIZE as i8 - rank, (file as u8 - b'a') as i8))
    }
}

// ============================================================================
// PIECE
// ============================================================================

/// A piece on the board: colour plus raw piece-type index.
///
/// The index is kept as given so that boards carrying reserved or unknown
/// indices can still be represented; such pieces never move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Piece {
    pub color: Color,
    pub code: u8,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Self {
            color,
            code: kind as u8,
        }
    }

    /// Resolve the piece type, `None` for reserved or unknown indices
    pub fn kind(&self) -> Option<PieceType> {
        PieceType::from_index(self.code)
    }

    pub fn is_king(&self) -> bool {
        self.kind() == Some(PieceType::King)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.color.code(), self.code)
    }
}

impl FromStr for Piece {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        let color = chars.next().and_then(Color::from_code);
        let code = chars.as_str().parse::<u8>().ok();
        match (color, code) {
            (Some(color), Some(code)) => Ok(Piece { color, code }),
            _ => Err(Error::InvalidPiece(s.to_string())),
        }
    }
}

impl TryFrom<String> for Piece {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Piece> for String {
    fn from(piece: Piece) -> Self {
        piece.to_string()
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// Rows of optional pieces, the interchange form of a board
pub type Rows = Vec<Vec<Option<Piece>>>;

/// Immutable board snapshot (clone to derive a new position)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Rows", into = "Rows")]
pub struct Board {
    /// Widest row; cells are laid out with this stride
    stride: usize,
    /// Length of each row (rows may be ragged)
    row_lens: Arc<[usize]>,
    /// Flat cell storage, `rows * stride` entries
    cells: Vec<Option<Piece>>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty rectangular board
    pub fn empty(rows: usize, cols: usize) -> Self {
        let rows = rows.clamp(1, MAX_DIMENSION);
        let cols = cols.min(MAX_DIMENSION);
        Self {
            stride: cols,
            row_lens: vec![cols; rows].into(),
            cells: vec![None; rows * cols],
        }
    }

    /// Standard starting position
    pub fn standard() -> Self {
        use PieceType::*;
        const BACK_RANK: [PieceType; BOARD_SIZE] =
            [Rook, Knight, Bishop, King, Queen, Bishop, Knight, Rook];

        let mut board = Board::empty(BOARD_SIZE, BOARD_SIZE);
        let last = BOARD_SIZE as i8 - 1;
        for (col, &kind) in BACK_RANK.iter().enumerate() {
            let col = col as i8;
            board.set(Square::new(0, col), Some(Piece::new(Color::Black, kind)));
            board.set(Square::new(1, col), Some(Piece::new(Color::Black, Pawn)));
            board.set(Square::new(last - 1, col), Some(Piece::new(Color::White, Pawn)));
            board.set(Square::new(last, col), Some(Piece::new(Color::White, kind)));
        }
        board
    }

    /// Build from rows; ragged rows are kept ragged
    pub fn from_rows(rows: Rows) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::EmptyBoard);
        }
        let stride = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.len() > MAX_DIMENSION || stride > MAX_DIMENSION {
            return Err(Error::BoardTooLarge {
                rows: rows.len(),
                cols: stride,
            });
        }

        let row_lens: Arc<[usize]> = rows.iter().map(Vec::len).collect();
        let mut cells = vec![None; rows.len() * stride];
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                cells[r * stride + c] = cell;
            }
        }

        Ok(Self {
            stride,
            row_lens,
            cells,
        })
    }

    /// Parse the JSON interchange form: rows of `"w4"` tokens or `null`
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Rows = serde_json::from_str(json)?;
        Self::from_rows(rows)
    }

    /// Parse a text diagram: one row per line, `.` for an empty cell.
    /// Blank lines and lines starting with `#` are skipped.
    pub fn from_text(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(|token| match token {
                    "." | ".." => Ok(None),
                    _ => token.parse().map(Some),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    /// Place or clear a cell. For building positions; the engine itself
    /// never calls this on a caller's board.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        if let Some(idx) = self.index(sq) {
            self.cells[idx] = piece;
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.row_lens.len()
    }

    /// Length of the widest row
    pub fn cols(&self) -> usize {
        self.stride
    }

    /// Length of one row (0 for rows that do not exist)
    pub fn row_len(&self, row: usize) -> usize {
        self.row_lens.get(row).copied().unwrap_or(0)
    }

    /// Whether the square exists, honouring per-row lengths
    pub fn contains(&self, sq: Square) -> bool {
        sq.row >= 0 && sq.col >= 0 && (sq.col as usize) < self.row_len(sq.row as usize)
    }

    fn index(&self, sq: Square) -> Option<usize> {
        self.contains(sq)
            .then(|| sq.row as usize * self.stride + sq.col as usize)
    }

    /// Piece on a square; `None` when empty or off the board
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.index(sq).and_then(|idx| self.cells[idx])
    }

    /// All occupied squares in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.row_lens.iter().enumerate().flat_map(move |(r, &len)| {
            (0..len).filter_map(move |c| {
                self.cells[r * self.stride + c]
                    .map(|piece| (Square::new(r as i8, c as i8), piece))
            })
        })
    }

    /// First king of the colour in row-major order
    pub fn find_king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|(_, piece)| piece.color == color && piece.is_king())
            .map(|(sq, _)| sq)
    }

    /// Back to the interchange form
    pub fn to_rows(&self) -> Rows {
        self.row_lens
            .iter()
            .enumerate()
            .map(|(r, &len)| self.cells[r * self.stride..r * self.stride + len].to_vec())
            .collect()
    }

    // ========================================================================
    // DERIVED SNAPSHOTS
    // ========================================================================

    /// Board after a generated move: the mover's piece lands on `to`
    /// (replacing any capture) and `from` is emptied.
    pub fn apply_move(&self, mv: &Move) -> Board {
        let mut next = self.clone();
        next.set(mv.to, Some(Piece::new(mv.color, mv.piece)));
        next.set(mv.from, None);
        next
    }

    /// Board after moving whatever stands on `from` to `to`
    pub fn move_piece(&self, from: Square, to: Square) -> Board {
        let mut next = self.clone();
        let piece = self.get(from);
        next.set(to, piece);
        next.set(from, None);
        next
    }

    /// Vertically flipped board with colours swapped
    pub fn mirrored(&self) -> Board {
        let rows = self
            .to_rows()
            .into_iter()
            .rev()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        cell.map(|p| Piece {
                            color: p.color.opponent(),
                            code: p.code,
                        })
                    })
                    .collect()
            })
            .collect();
        // Same shape as self, so this cannot fail
        Board::from_rows(rows).unwrap_or_else(|_| self.clone())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}

impl TryFrom<Rows> for Board {
    type Error = Error;

    fn try_from(rows: Rows) -> Result<Self> {
        Board::from_rows(rows)
    }
}

impl From<Board> for Rows {
    fn from(board: Board) -> Self {
        board.to_rows()
    }
}

impl FromStr for Board {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Board::from_text(s)
    }
}

/// Text diagram, the format read by `Board::from_text`
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            let line = row
                .iter()
                .map(|cell| match cell {
                    Some(piece) => format!("{:<2}", piece.to_string()),
                    None => ". ".to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
