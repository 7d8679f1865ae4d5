use thiserror::Error;
use std::io;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Extraction error: item {index} produced no text")]
    Extraction { index: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Chunk {chunk} failed: {message}")]
    ChunkTask { chunk: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

// Type alias for Result
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn chunk_task<S: Into<String>>(chunk: usize, msg: S) -> Self {
        Error::ChunkTask { chunk, message: msg.into() }
    }

    /// True for the outcome reported when a cancellation checkpoint fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(format!("Thread pool build failed: {}", err))
    }
}
