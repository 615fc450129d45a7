//! Photo-to-Boggle-board extraction and solving.
//!
//! A vision model reads the board photo ([`OcrModel`]), its free-text reply is decoded
//! into a [`LetterGrid`] and canonicalized into a [`CanonicalBoard`] such as
//! `"abcd eqgh ijkl mnop"`. The board string is later handed to a [`WordSearch`]
//! implementation to rank the words it contains.

pub mod board;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod image;
pub mod model;
pub mod request;
pub mod server;
pub mod solver;

pub use board::CanonicalBoard;
pub use config::{InferenceConfig, ServerConfig};
pub use engine::{BoardEngine, BoardExtraction};
pub use error::{ExtractError, SolveError};
pub use grid::{LetterGrid, extract_grid, strip_code_fence};
pub use image::{EncodedImage, RawImage};
pub use model::{HttpOcrModel, OcrModel};
pub use request::{OcrRequest, OcrRequestBuilder};
pub use solver::{
    Dictionary, DictionarySolver, SolveResult, SolvedBoard, WordSearch, solve,
};
