//! Error types for studymate.

use thiserror::Error;

/// Result type alias using studymate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for studymate operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Text extraction from an uploaded file failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Inference/generation failed (transport or provider side)
    #[error("Inference error: {0}")]
    Inference(String),

    /// Model output did not match the requested response schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the current session state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Blob storage upload failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// True when the failure came from the network or the provider rather
    /// than from the shape of a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Inference(_) | Error::Request(_))
    }
}
