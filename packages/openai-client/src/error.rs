//! Error types for the OpenAI client.

use thiserror::Error;

/// Result type for OpenAI client operations.
pub type Result<T> = std::result::Result<T, OpenAIError>;

/// OpenAI client errors.
#[derive(Debug, Error)]
pub enum OpenAIError {
    /// Missing API key or invalid client settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failed or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl OpenAIError {
    /// True for 429 responses.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, OpenAIError::Api { status: 429, .. })
    }
}
