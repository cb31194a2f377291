//! Error types for the optimizer

use thiserror::Error;

/// Result type alias for optimizer operations
pub type Result<T> = std::result::Result<T, OptimizerError>;

/// Error types for fee estimation, routing and reporting
#[derive(Error, Debug)]
pub enum OptimizerError {
    #[error("No corridor between {from} and {to}")]
    NoCorridor { from: String, to: String },

    #[error("No valid routes found between {from} and {to}")]
    NoRouteFound { from: String, to: String },

    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Intent error: {message}")]
    Intent { message: String },

    #[error("Corridor error: {0}")]
    Corridor(#[from] aifi_corridors::CorridorError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OptimizerError {
    /// Create a no-corridor error
    pub fn no_corridor<F: Into<String>, T: Into<String>>(from: F, to: T) -> Self {
        Self::NoCorridor {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a no-route error
    pub fn no_route<F: Into<String>, T: Into<String>>(from: F, to: T) -> Self {
        Self::NoRouteFound {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create an invalid query error
    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a model error
    pub fn model<S: Into<String>>(message: S) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    /// Create an intent error
    pub fn intent<S: Into<String>>(message: S) -> Self {
        Self::Intent {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error reports an absent corridor or route rather than a
    /// failure of the optimizer itself
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            OptimizerError::NoCorridor { .. } | OptimizerError::NoRouteFound { .. }
        )
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            OptimizerError::NoCorridor { .. } => "not_found",
            OptimizerError::NoRouteFound { .. } => "not_found",
            OptimizerError::InvalidQuery { .. } => "validation",
            OptimizerError::Model { .. } => "model",
            OptimizerError::Intent { .. } => "intent",
            OptimizerError::Corridor(_) => "corridor",
            OptimizerError::Config(_) => "config",
            OptimizerError::Serialization(_) => "serialization",
            OptimizerError::Yaml(_) => "serialization",
            OptimizerError::Io(_) => "io",
            OptimizerError::Internal(_) => "internal",
        }
    }
}
