use thiserror::Error;

/// All errors produced by lexis-core.
#[derive(Debug, Error)]
pub enum LexisError {
    #[error("invalid vocabulary: {0}")]
    InvalidVocabulary(String),

    #[error("unknown symbol: {symbol:?}")]
    UnknownSymbol { symbol: char },

    #[error("index {index} out of range for vocabulary of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("probability matrix has {columns} columns but vocabulary size is {vocab_size}")]
    ShapeMismatch { columns: usize, vocab_size: usize },

    #[error("valid length {valid_frames} exceeds matrix frame count {frames}")]
    InvalidLength { valid_frames: usize, frames: usize },

    #[error("beam width must be at least 1, got {0}")]
    InvalidBeamWidth(usize),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LexisError>;
