//! Error types for agent-core

use thiserror::Error;

/// Result type alias for agent-core
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for agent operations
#[derive(Error, Debug)]
pub enum Error {
    /// Generic error message
    #[error("{0}")]
    Generic(String),

    /// Agent initialization failed
    #[error("Agent initialization failed: {0}")]
    InitializationFailed(String),

    /// Agent processing failed
    #[error("Agent processing failed: {0}")]
    ProcessingFailed(String),

    /// The model asked for a tool the active agent does not expose
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool input did not match the tool's schema
    #[error("Invalid input for tool '{tool}': {message}")]
    InvalidToolInput { tool: String, message: String },

    /// An input guardrail rejected the request
    #[error("Guardrail '{guardrail}' tripped: {reason}")]
    GuardrailTripped { guardrail: String, reason: String },

    /// The run did not produce a final answer within the turn budget
    #[error("Max turns ({0}) exceeded")]
    MaxTurnsExceeded(usize),
}

impl Error {
    /// Whether this error came from a guardrail rejecting the input
    pub fn is_guardrail(&self) -> bool {
        matches!(self, Self::GuardrailTripped { .. })
    }
}
