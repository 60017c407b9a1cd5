//! Gemini-specific error handling.

use studymate_core::Error;

/// Gemini API error codes, derived from HTTP status and the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Missing or invalid API key.
    AuthenticationError,
    /// Key valid but not allowed to use the model or feature.
    PermissionDenied,
    /// Quota or rate limit exceeded.
    ResourceExhausted,
    /// Model not found or not available.
    ModelNotFound,
    /// Malformed request (bad schema, unsupported field).
    InvalidArgument,
    /// Provider-side failure or overload.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Determine error code from HTTP status and the error `status` string.
    pub fn from_response(status: u16, error_status: &str) -> Self {
        match (status, error_status) {
            (401, _) | (_, "UNAUTHENTICATED") => Self::AuthenticationError,
            (403, _) | (_, "PERMISSION_DENIED") => Self::PermissionDenied,
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::ResourceExhausted,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            (400, _) | (_, "INVALID_ARGUMENT") | (_, "FAILED_PRECONDITION") => {
                Self::InvalidArgument
            }
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ResourceExhausted | Self::ServerError)
    }
}

/// Convert a Gemini error to a studymate Error.
pub fn to_studymate_error(code: GeminiErrorCode, message: &str) -> Error {
    match code {
        GeminiErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        GeminiErrorCode::PermissionDenied => {
            Error::Config(format!("Permission denied: {}", message))
        }
        GeminiErrorCode::ResourceExhausted => {
            Error::Inference(format!("Quota exceeded: {}", message))
        }
        GeminiErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        GeminiErrorCode::InvalidArgument => {
            Error::Inference(format!("Invalid request: {}", message))
        }
        GeminiErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        GeminiErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}
