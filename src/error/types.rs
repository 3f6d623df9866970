// Screening error types and retryability classification
use thiserror::Error;

use crate::models::check::CheckCategory;

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("Invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Unknown risk profile: {name}")]
    UnknownProfile { name: String },

    #[error("Invalid risk profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("Check {category} failed: {message}")]
    CheckFailed {
        category: CheckCategory,
        message: String,
    },

    #[error("Check {category} timed out after {millis}ms")]
    CheckTimeout { category: CheckCategory, millis: u64 },

    #[error("Persistence operation '{operation}' failed: {message}")]
    PersistenceFailure { operation: String, message: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ScreenerError {
    pub fn check_failed(category: CheckCategory, message: impl Into<String>) -> Self {
        ScreenerError::CheckFailed {
            category,
            message: message.into(),
        }
    }

    /// Transient check errors may be retried; caller mistakes and
    /// validation failures are permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ScreenerError::CheckFailed { .. } | ScreenerError::CheckTimeout { .. }
        )
    }

    /// Caller errors that surface immediately from the coordinator.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ScreenerError::InvalidAddress { .. }
                | ScreenerError::UnknownProfile { .. }
                | ScreenerError::InvalidProfile { .. }
                | ScreenerError::ConfigurationError(_)
        )
    }
}

impl From<String> for ScreenerError {
    fn from(message: String) -> Self {
        ScreenerError::Internal { message }
    }
}

impl From<&str> for ScreenerError {
    fn from(message: &str) -> Self {
        ScreenerError::Internal {
            message: message.to_string(),
        }
    }
}
