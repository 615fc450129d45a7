use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ExtractError;
use crate::grid::LetterGrid;

/// Two-letter token the model uses for the "Qu" tile.
pub const DIGRAPH_TOKEN: &str = "qu";
/// Single symbol the "Qu" tile collapses to.
pub const DIGRAPH_SYMBOL: char = 'q';

/// Lower-case rows of one character per cell, joined by single spaces.
///
/// This is the only format exchanged between extraction and solving, e.g.
/// `"abcd eqgh ijkl mnop"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalBoard(String);

impl CanonicalBoard {
    pub fn from_grid(grid: &LetterGrid) -> Self {
        let rows: Vec<String> = grid
            .rows()
            .iter()
            .map(|row| row.iter().map(|cell| canonical_cell(cell)).collect())
            .collect();
        Self(rows.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.0.split(' ')
    }

    /// Splits the board back into one cell per character.
    ///
    /// Fails when the rows differ in length, which only happens if the model put an
    /// empty or multi-letter token other than "Qu" in a cell.
    pub fn to_grid(&self) -> Result<LetterGrid, ExtractError> {
        let rows = self
            .rows()
            .map(|row| row.chars().map(String::from).collect())
            .collect();
        LetterGrid::new(rows)
    }
}

impl fmt::Display for CanonicalBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalBoard> for String {
    fn from(board: CanonicalBoard) -> Self {
        board.0
    }
}

fn canonical_cell(cell: &str) -> String {
    let cell = cell.trim().to_lowercase();
    if cell == DIGRAPH_TOKEN {
        DIGRAPH_SYMBOL.to_string()
    } else {
        cell
    }
}
