//! Error types for matrix marshaling and kernel dispatch

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("operand shapes do not match: {left_rows}x{left_cols} vs {right_rows}x{right_cols}")]
    ShapeMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },

    #[error("matrix is singular")]
    Singular,

    #[error("not implemented for this domain: {0}")]
    Unsupported(&'static str),

    #[error("eigenvalues have no exact closed form over the integers")]
    NotExact,

    #[error("engine failure: {0}")]
    EngineFailure(&'static str),

    #[error("scratch stack exhausted: needed {needed} cells, capacity {capacity}")]
    ScratchExhausted { needed: usize, capacity: usize },

    #[error("buffer allocation too large: {rows}x{cols} cells overflows")]
    AllocationTooLarge { rows: usize, cols: usize },

    #[error("interrupted during engine call")]
    Interrupted,
}

impl Error {
    /// Shape-mismatch error from two dimension pairs.
    pub fn shape_mismatch(left: (usize, usize), right: (usize, usize)) -> Self {
        Error::ShapeMismatch {
            left_rows: left.0,
            left_cols: left.1,
            right_rows: right.0,
            right_cols: right.1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
