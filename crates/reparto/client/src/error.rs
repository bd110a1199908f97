//! Client error types

use thiserror::Error;

/// Errors from the assignment REST client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API error response, reported verbatim to the caller
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message body
        message: String,
    },

    /// Missing or rejected credentials; the auth collaborator must force
    /// a logout
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Local evidence/payment validation failed; nothing was sent
    #[error("Validation failed: {0}")]
    Validation(#[from] reparto_types::DeliveryError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
