//! Common error types for inventa

use thiserror::Error;

/// Common result type for inventa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the inventa crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// External sheet source unreachable (auth, network, not-found)
    #[error("Sheet source unavailable: {0}")]
    SourceUnavailable(String),

    /// All sheets yielded zero usable rows
    #[error("Sheet source yielded no records")]
    EmptyResult,

    /// Write to the local store or the destination sheet failed
    #[error("Destination write failed: {0}")]
    DestinationWrite(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
