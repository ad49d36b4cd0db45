//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable held a value that failed validation.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        /// Variable name.
        field: &'static str,
        /// Offending value when it is safe to echo.
        value: Option<String>,
        /// Human-readable reason.
        message: String,
    },
    /// A required variable was not set.
    #[error("missing required setting '{field}'")]
    MissingField {
        /// Variable name.
        field: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn invalid(
        field: &'static str,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            value: Some(value.into()),
            message: message.into(),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
