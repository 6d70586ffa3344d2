//! Laser safe puzzle representation.
//!
//! A safe is a rectangular grid of empty cells, lasers and pillars. Two input
//! formats are accepted:
//!
//! - the plain text format: a `rows cols` header followed by one line per row
//!   of whitespace-separated tiles;
//! - JSON: `{"grid": [". 2 .", "L . X"]}`, whitespace inside rows ignored.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while loading a safe
#[derive(Debug, Error)]
pub enum SafeError {
    #[error("failed to read safe: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid safe JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing `rows cols` header")]
    MissingHeader,
    #[error("malformed header {0:?}, expected `rows cols`")]
    BadHeader(String),
    #[error("safe has no cells")]
    Empty,
    #[error("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[error("row {row} has {found} tiles, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {tile:?} at ({row}, {col})")]
    BadTile { row: usize, col: usize, tile: String },
}

/// A single cell of the safe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Laser,
    /// A pillar, with the exact number of adjacent lasers it demands
    Pillar(Option<u8>),
}

impl Tile {
    /// Parse a tile character. Beams (`*`) are derived, so they read as empty.
    pub fn from_char(c: char) -> Option<Tile> {
        match c {
            '.' | '*' => Some(Tile::Empty),
            'L' => Some(Tile::Laser),
            'X' => Some(Tile::Pillar(None)),
            '0'..='4' => Some(Tile::Pillar(c.to_digit(10).map(|d| d as u8))),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Laser => 'L',
            Tile::Pillar(None) => 'X',
            Tile::Pillar(Some(n)) => char::from(b'0' + n),
        }
    }

    pub fn is_pillar(self) -> bool {
        matches!(self, Tile::Pillar(_))
    }

    /// The demanded laser count for numbered pillars
    pub fn demand(self) -> Option<usize> {
        match self {
            Tile::Pillar(Some(n)) => Some(n as usize),
            _ => None,
        }
    }
}

/// Beam directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row, col) step
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// Serialized form shared by the JSON reader and writer
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SafeFile {
    grid: Vec<String>,
}

/// The safe grid, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SafeFile", into = "SafeFile")]
pub struct Safe {
    rows: usize,
    cols: usize,
    tiles: Vec<Tile>,
}

impl TryFrom<SafeFile> for Safe {
    type Error = SafeError;

    fn try_from(file: SafeFile) -> Result<Self, Self::Error> {
        let rows: Vec<Vec<String>> = file
            .grid
            .iter()
            .map(|row| row.chars().filter(|c| !c.is_whitespace()).map(String::from).collect())
            .collect();
        let cols = rows.first().map_or(0, Vec::len);
        Safe::from_rows(rows.len(), cols, rows)
    }
}

impl From<Safe> for SafeFile {
    fn from(safe: Safe) -> Self {
        SafeFile {
            grid: safe.render_rows(&[]),
        }
    }
}

impl Safe {
    /// Build a safe from tokenized rows, checking every dimension.
    fn from_rows(rows: usize, cols: usize, grid: Vec<Vec<String>>) -> Result<Self, SafeError> {
        if rows == 0 || cols == 0 {
            return Err(SafeError::Empty);
        }
        if grid.len() != rows {
            return Err(SafeError::RowCount {
                expected: rows,
                found: grid.len(),
            });
        }

        if let Some((row, tokens)) = grid.iter().enumerate().find(|(_, t)| t.len() != cols) {
            return Err(SafeError::RowWidth {
                row,
                expected: cols,
                found: tokens.len(),
            });
        }

        // Every row now has exactly `cols` tokens, so this cannot overflow.
        let mut tiles = Vec::with_capacity(rows * cols);
        for (row, tokens) in grid.iter().enumerate() {
            for (col, token) in tokens.iter().enumerate() {
                let mut chars = token.chars();
                let tile = match (chars.next(), chars.next()) {
                    (Some(c), None) => Tile::from_char(c),
                    _ => None,
                };
                let tile = tile.ok_or_else(|| SafeError::BadTile {
                    row,
                    col,
                    tile: token.clone(),
                })?;
                tiles.push(tile);
            }
        }

        Ok(Self { rows, cols, tiles })
    }

    /// Parse the text format.
    pub fn from_text(text: &str) -> Result<Self, SafeError> {
        let mut lines = text.lines().filter(|line| !line.trim().is_empty());

        let header = lines.next().ok_or(SafeError::MissingHeader)?;
        let dims: Vec<usize> = header
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|_| SafeError::BadHeader(header.to_string()))?;
        let (rows, cols) = match dims.as_slice() {
            [rows, cols] => (*rows, *cols),
            _ => return Err(SafeError::BadHeader(header.to_string())),
        };
        if rows.checked_mul(cols).is_none() {
            return Err(SafeError::BadHeader(header.to_string()));
        }

        let grid = lines
            .map(|line| line.split_whitespace().map(String::from).collect())
            .collect();
        Self::from_rows(rows, cols, grid)
    }

    /// Parse the JSON format.
    pub fn from_json(json: &str) -> Result<Self, SafeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse either format, picking JSON when the input starts with `{`.
    pub fn parse(input: &str) -> Result<Self, SafeError> {
        if input.trim_start().starts_with('{') {
            Self::from_json(input)
        } else {
            Self::from_text(input)
        }
    }

    /// Load a safe file; `.json` files are read as JSON.
    pub fn load(path: &Path) -> Result<Self, SafeError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_text(&content),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    pub fn tile(&self, index: usize) -> Tile {
        self.tiles[index]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.rows && col < self.cols {
            Some(self.tiles[self.index(row, col)])
        } else {
            None
        }
    }

    pub(crate) fn set(&mut self, index: usize, tile: Tile) {
        self.tiles[index] = tile;
    }

    /// The cell one step from `index` in `direction`, if inside the grid
    pub fn step(&self, index: usize, direction: Direction) -> Option<usize> {
        let (row, col) = self.position(index);
        let (dr, dc) = direction.delta();
        let row = row.checked_add_signed(dr)?;
        let col = col.checked_add_signed(dc)?;
        (row < self.rows && col < self.cols).then(|| self.index(row, col))
    }

    /// Orthogonal neighbours inside the grid
    pub fn neighbors(&self, index: usize) -> SmallVec<[usize; 4]> {
        Direction::ALL
            .iter()
            .filter_map(|&d| self.step(index, d))
            .collect()
    }

    /// Indices of numbered pillars
    pub fn numbered_pillars(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter_map(|(i, t)| t.demand().map(|n| (i, n)))
    }

    /// Laser flags for every cell, as given in the grid
    pub fn lasers(&self) -> Vec<bool> {
        self.tiles.iter().map(|&t| t == Tile::Laser).collect()
    }

    /// Render each row as space-separated tiles. Cells flagged in `covered`
    /// that are empty are drawn as beams.
    pub fn render_rows(&self, covered: &[bool]) -> Vec<String> {
        (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| {
                        let i = self.index(row, col);
                        match self.tiles[i] {
                            Tile::Empty if covered.get(i).copied().unwrap_or(false) => '*',
                            tile => tile.to_char(),
                        }
                    })
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

impl fmt::Display for Safe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.render_rows(&[]) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
