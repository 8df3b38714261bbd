//! Crate error type.
//!
//! Scoring and simulation never fail; only decoding and generation do.

/// Errors from loading, validating, or generating puzzles.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("puzzle file inaccessible: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode puzzle: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),
    /// The sampling volume cannot hold every requested placement.
    #[error("cannot place {required} entities in a volume of {capacity} cells")]
    Overcrowded { capacity: u64, required: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
