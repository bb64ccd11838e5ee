//! The `LocatorError` type.

use thiserror::Error;

/// Errors raised while starting, configuring or stopping a locator.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// A configuration value is out of range or could not be parsed.
    #[error("invalid locator config `{field}`: {message}")]
    InvalidConfig {
        field: &'static str,
        message: String,
    },

    /// `Locator::start` was called without a tokio runtime to host the consumer.
    #[error("region locator must be started from within a tokio runtime")]
    NoRuntime,

    /// The background consumer did not exit cleanly.
    #[error("region locator consumer failed: {message}")]
    ConsumerFailed { message: String },
}

impl LocatorError {
    /// Create an `InvalidConfig` error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        LocatorError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Short stable code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            LocatorError::InvalidConfig { .. } => "LOC_INVALID_CONFIG",
            LocatorError::NoRuntime => "LOC_NO_RUNTIME",
            LocatorError::ConsumerFailed { .. } => "LOC_CONSUMER_FAILED",
        }
    }
}

impl From<tokio::task::JoinError> for LocatorError {
    fn from(err: tokio::task::JoinError) -> Self {
        LocatorError::ConsumerFailed {
            message: err.to_string(),
        }
    }
}
