//! Error types for Pokemon TCG API access

use thiserror::Error;

/// Unified error type for card data operations
#[derive(Debug, Error)]
pub enum TcgError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// HTTP error status code without a readable error body
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    /// The API answered with its own error document
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A URL could not be parsed or uses an unsupported scheme
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Image host is not on the allow-list
    #[error("Image host not allowed: {0}")]
    ImageHostNotAllowed(String),
}

impl TcgError {
    /// True when the failure was caused by the caller's input rather than
    /// the remote API or the network.
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            TcgError::InvalidUrl(_) | TcgError::ImageHostNotAllowed(_)
        )
    }
}

/// Result alias for card data operations
pub type Result<T> = std::result::Result<T, TcgError>;
