//! Error types for stock data operations

use thiserror::Error;

/// Stock data specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// A caller-supplied date is not a valid `YYYY-MM-DD` calendar date
    #[error("Invalid date '{value}' for {field}: expected YYYY-MM-DD")]
    DateFormat { field: &'static str, value: String },

    /// The resolved window ends before it starts
    #[error("Invalid date range: start {start} is after end {end}")]
    DateRange { start: String, end: String },

    /// Invalid stock symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The price request could not be completed
    #[error("Failed to retrieve data for {symbol}: {reason}")]
    DataRetrieval { symbol: String, reason: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl StockError {
    /// Whether the caller's input was at fault
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::DateFormat { .. } | Self::DateRange { .. } | Self::InvalidSymbol(_)
        )
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;

/// Convert StockError to agent_core::Error
impl From<StockError> for agent_core::Error {
    fn from(err: StockError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}

/// Convert agent_core::Error to StockError
impl From<agent_core::Error> for StockError {
    fn from(err: agent_core::Error) -> Self {
        StockError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StockError::DateFormat {
            field: "start_date",
            value: "2024-02-30".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date '2024-02-30' for start_date: expected YYYY-MM-DD"
        );
        assert!(err.is_invalid_input());

        let err = StockError::DataRetrieval {
            symbol: "IBM".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to retrieve data for IBM: connection refused");
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_error_conversion() {
        let stock_err = StockError::InvalidSymbol(String::new());
        let agent_err: agent_core::Error = stock_err.into();

        match agent_err {
            agent_core::Error::ProcessingFailed(msg) => {
                assert!(msg.contains("Invalid symbol"));
            },
            _ => panic!("Expected ProcessingFailed variant"),
        }
    }
}
