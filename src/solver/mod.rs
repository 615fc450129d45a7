//! Solving a canonical board string through a word-search capability.
//!
//! The extraction pipeline never depends on a concrete solver: anything implementing
//! [`WordSearch`] can be plugged in. [`DictionarySolver`] is the bundled implementation.

mod dictionary;

pub use dictionary::{Dictionary, DictionarySolver, MIN_WORD_LEN, SolvedWords, score};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::SolveError;

/// Finds the valid words of a board.
pub trait WordSearch: Send + Sync {
    /// The solved board, queried for rankings and the full word set.
    type Solved: SolvedBoard;

    /// Solves a canonical board string; rejects boards the solver cannot use.
    fn solve(&self, board: &str) -> Result<Self::Solved, SolveError>;
}

pub trait SolvedBoard {
    /// The `top` best words, best first, without duplicates.
    fn rank(&self, top: usize) -> Vec<String>;

    /// Every distinct valid word on the board.
    fn words(&self) -> &BTreeSet<String>;
}

/// Response of the solve operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    pub best_words: Vec<String>,
    pub total_words: usize,
}

/// Solves `board` and keeps the `top` best words plus the total word count.
///
/// Nothing is cached; every call re-solves the board.
pub fn solve<W: WordSearch>(
    search: &W,
    board: &str,
    top: usize,
) -> Result<SolveResult, SolveError> {
    let solved = search.solve(board)?;
    let result = SolveResult {
        best_words: solved.rank(top),
        total_words: solved.words().len(),
    };
    log::debug!(
        "Solved board {board:?}: {} words, returning {}",
        result.total_words,
        result.best_words.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pretends every row of the board is a word.
    struct RowWords;

    struct Rows(BTreeSet<String>);

    impl SolvedBoard for Rows {
        fn rank(&self, top: usize) -> Vec<String> {
            self.0.iter().take(top).cloned().collect()
        }

        fn words(&self) -> &BTreeSet<String> {
            &self.0
        }
    }

    impl WordSearch for RowWords {
        type Solved = Rows;

        fn solve(&self, board: &str) -> Result<Rows, SolveError> {
            if board.is_empty() {
                return Err(SolveError::invalid_board("empty"));
            }
            Ok(Rows(board.split(' ').map(str::to_string).collect()))
        }
    }

    #[test]
    fn ranks_top_subset_and_counts_everything() {
        let result = solve(&RowWords, "abcd eqgh ijkl mnop", 2).unwrap();
        assert_eq!(result.best_words, ["abcd", "eqgh"]);
        assert_eq!(result.total_words, 4);
    }

    #[test]
    fn solver_errors_pass_through() {
        assert!(matches!(
            solve(&RowWords, "", 50),
            Err(SolveError::InvalidBoard { .. })
        ));
    }

    #[test]
    fn result_serializes_with_wire_names() {
        let result = SolveResult {
            best_words: vec!["quit".to_string()],
            total_words: 3,
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            serde_json::json!({ "best_words": ["quit"], "total_words": 3 })
        );
    }
}
