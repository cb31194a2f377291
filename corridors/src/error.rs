//! Error types for the corridor layer

use thiserror::Error;

/// Result type alias for corridor operations
pub type Result<T> = std::result::Result<T, CorridorError>;

/// Error types for corridor data and graph operations
#[derive(Error, Debug)]
pub enum CorridorError {
    #[error("Invalid corridor {from} -> {to}: {reason}")]
    InvalidCorridor {
        from: String,
        to: String,
        reason: String,
    },

    #[error("Invalid fee type: {0}")]
    InvalidFeeType(String),

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CorridorError {
    /// Create a new invalid corridor error
    pub fn invalid_corridor<F, T, R>(from: F, to: T, reason: R) -> Self
    where
        F: Into<String>,
        T: Into<String>,
        R: Into<String>,
    {
        Self::InvalidCorridor {
            from: from.into(),
            to: to.into(),
            reason: reason.into(),
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CorridorError::InvalidCorridor { .. } => "validation",
            CorridorError::InvalidFeeType(_) => "validation",
            CorridorError::InvalidProvider(_) => "validation",
            CorridorError::Serialization(_) => "serialization",
            CorridorError::Io(_) => "io",
        }
    }
}
