use std::{
    cmp::Reverse,
    collections::BTreeSet,
    ops::Bound,
    path::Path,
};

use super::{SolvedBoard, WordSearch};
use crate::board::DIGRAPH_SYMBOL;
use crate::error::SolveError;

/// Shortest word accepted under official rules.
pub const MIN_WORD_LEN: usize = 3;

/// Largest board the solver accepts, in cells.
const MAX_BOARD_CELLS: usize = 100;

/// Official Boggle points for a word of the given length.
pub fn score(word: &str) -> u32 {
    match word.len() {
        0..=2 => 0,
        3 | 4 => 1,
        5 => 2,
        6 => 3,
        7 => 5,
        _ => 11,
    }
}

/// Lower-case word list with prefix lookups.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: BTreeSet<String>,
}

impl Dictionary {
    /// Reads a newline-delimited word list.
    pub fn load(path: &Path) -> Result<Self, SolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| SolveError::Dictionary {
            path: path.display().to_string(),
            source,
        })?;
        let dictionary = Self::from_words(text.lines());
        log::info!(
            "Loaded {} words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Keeps purely alphabetic words of at least [`MIN_WORD_LEN`] letters, lower-cased.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_ascii_lowercase())
            .filter(|w| w.len() >= MIN_WORD_LEN && w.bytes().all(|b| b.is_ascii_lowercase()))
            .collect();
        Self { words }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.words
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .next()
            .is_some_and(|word| word.starts_with(prefix))
    }
}

/// Rectangular board of lower-case cells parsed from a canonical board string.
struct Grid {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Grid {
    fn parse(board: &str) -> Result<Self, SolveError> {
        let rows: Vec<&str> = board.split_whitespace().collect();
        let Some(first) = rows.first() else {
            return Err(SolveError::invalid_board("board is empty"));
        };

        let width = first.chars().count();
        if rows.iter().any(|row| row.chars().count() != width) {
            return Err(SolveError::invalid_board("rows have different lengths"));
        }
        if width * rows.len() > MAX_BOARD_CELLS {
            return Err(SolveError::invalid_board(format!(
                "board has more than {MAX_BOARD_CELLS} cells"
            )));
        }

        let cells: Vec<char> = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if let Some(bad) = cells.iter().find(|c| !c.is_ascii_lowercase()) {
            return Err(SolveError::invalid_board(format!(
                "cell {bad:?} is not a letter"
            )));
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (row, col) = ((index / self.width) as isize, (index % self.width) as isize);
        (-1isize..=1)
            .flat_map(|dr| (-1isize..=1).map(move |dc| (dr, dc)))
            .filter(|&offset| offset != (0, 0))
            .filter_map(move |(dr, dc)| {
                let (r, c) = (row + dr, col + dc);
                let inside = r >= 0
                    && c >= 0
                    && (r as usize) < self.height
                    && (c as usize) < self.width;
                inside.then(|| r as usize * self.width + c as usize)
            })
    }
}

/// Word search over a [`Dictionary`], following standard Boggle rules.
///
/// Words are traced through horizontally, vertically or diagonally adjacent cells,
/// each cell used at most once per word. The `q` cell reads as "qu".
#[derive(Debug, Clone)]
pub struct DictionarySolver {
    dictionary: Dictionary,
}

impl DictionarySolver {
    pub fn new(dictionary: Dictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    fn trace(
        &self,
        grid: &Grid,
        index: usize,
        visited: &mut [bool],
        prefix: &mut String,
        found: &mut BTreeSet<String>,
    ) {
        let restore = prefix.len();
        let cell = grid.cells[index];
        prefix.push(cell);
        if cell == DIGRAPH_SYMBOL {
            prefix.push('u');
        }

        if self.dictionary.has_prefix(prefix) {
            if self.dictionary.contains(prefix) {
                found.insert(prefix.clone());
            }
            visited[index] = true;
            for next in grid.neighbours(index) {
                if !visited[next] {
                    self.trace(grid, next, visited, prefix, found);
                }
            }
            visited[index] = false;
        }

        prefix.truncate(restore);
    }
}

/// Words found on one board.
#[derive(Debug, Clone)]
pub struct SolvedWords {
    words: BTreeSet<String>,
}

impl SolvedBoard for SolvedWords {
    /// Highest score first, then longer words, then alphabetical.
    fn rank(&self, top: usize) -> Vec<String> {
        let mut ranked: Vec<&String> = self.words.iter().collect();
        ranked.sort_by_key(|word| (Reverse(score(word)), Reverse(word.len()), *word));
        ranked.into_iter().take(top).cloned().collect()
    }

    fn words(&self) -> &BTreeSet<String> {
        &self.words
    }
}

impl WordSearch for DictionarySolver {
    type Solved = SolvedWords;

    fn solve(&self, board: &str) -> Result<SolvedWords, SolveError> {
        let grid = Grid::parse(board)?;
        let mut visited = vec![false; grid.cells.len()];
        let mut prefix = String::new();
        let mut words = BTreeSet::new();

        for index in 0..grid.cells.len() {
            self.trace(&grid, index, &mut visited, &mut prefix, &mut words);
        }

        Ok(SolvedWords { words })
    }
}
