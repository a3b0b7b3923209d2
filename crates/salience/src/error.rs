//! Error types for the salience pipeline

use thiserror::Error;
use uuid::Uuid;

/// Main error type for salience operations
#[derive(Error, Debug)]
pub enum SalienceError {
    /// Out-of-range or negative inputs (negative elapsed time, zero capacity, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Threshold ordering or range violated when building a component
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation needing a vector was called before one was attached
    #[error("Record {0} has no embedding")]
    MissingEmbedding(Uuid),

    /// Embedding length disagrees with the store's fixed dimension
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Config file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SalienceError {
    fn from(e: serde_json::Error) -> Self {
        SalienceError::Serialization(e.to_string())
    }
}

/// Result type alias for salience operations
pub type Result<T> = std::result::Result<T, SalienceError>;
