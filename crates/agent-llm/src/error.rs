//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors raised while talking to a chat completions endpoint
#[derive(Error, Debug)]
pub enum LLMError {
    /// The endpoint answered with a status that has no more specific variant
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// HTTP 401; `OPENAI_API_KEY` was rejected
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    /// HTTP 429, with the provider's explanation
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// HTTP 400, usually a malformed tool schema or response format
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP 404 for the requested model
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Connection, timeout or body read failure
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// A 2xx body we could not use: no choices, or tool-call arguments that
    /// are not JSON
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Missing or invalid provider settings
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}
