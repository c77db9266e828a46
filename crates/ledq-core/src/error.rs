//! Error types for ledq.

use thiserror::Error;

/// Result type alias using ledq's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ledq operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/network request to the graph store failed
    #[error("Request error: {0}")]
    Request(String),

    /// Graph store answered with a non-success status
    #[error("Endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },

    /// Result document could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
