// Error types for skinstash.
// Covers configuration, marketplace API, and local cache persistence failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StashError {
    #[error("Marketplace API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or revoked API key")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Item not found on the market: {0}")]
    ItemNotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Marketplace rejected the request: {0}")]
    Remote(String),

    #[error("Missing marketplace API key")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl StashError {
    /// Whether this error came from talking to the marketplace.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            StashError::Api(_)
                | StashError::Unauthorized
                | StashError::NotFound(_)
                | StashError::RateLimited { .. }
                | StashError::Remote(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StashError>;
