use thiserror::Error;

/// Domain-specific error types for the inference data collector
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Errors for lookback windows outside the supported set
    #[error("Invalid timeframe: {input}")]
    InvalidTimeframe { input: String },

    /// Errors related to invalid field formats
    #[error("Invalid {field}: {message}")]
    InvalidFormat { field: String, message: String },

    /// Configuration errors
    #[error("Configuration error: {parameter} - {message}")]
    ConfigurationError { parameter: String, message: String },

    /// Errors when a node query fails after all attempts
    #[error("Query command failed: {message}")]
    CommandFailed { message: String },

    /// Errors when a node query exceeds its wall-clock timeout
    #[error("Query timed out after {timeout_seconds} seconds")]
    CommandTimeout { timeout_seconds: u64 },

    /// Errors when the requested height is below the node's retention floor
    #[error("Block history pruned: {message}")]
    PrunedHistory { message: String },

    /// Errors when a node response is missing fields or cannot be parsed
    #[error("Malformed node response: {message}")]
    MalformedResponse { message: String },

    /// Errors when a topic does not exist or cannot be resolved
    #[error("Topic not found: {topic_id}")]
    TopicNotFound { topic_id: u64 },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CollectorError {
    /// Create an invalid timeframe error
    pub fn invalid_timeframe(input: impl Into<String>) -> Self {
        Self::InvalidTimeframe {
            input: input.into(),
        }
    }

    /// Create an invalid format error
    pub fn invalid_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a command failure error
    pub fn command_failed(message: impl Into<String>) -> Self {
        Self::CommandFailed {
            message: message.into(),
        }
    }

    /// Create a command timeout error
    #[must_use]
    pub const fn command_timeout(timeout_seconds: u64) -> Self {
        Self::CommandTimeout { timeout_seconds }
    }

    /// Create a pruned history error
    pub fn pruned_history(message: impl Into<String>) -> Self {
        Self::PrunedHistory {
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a topic not found error
    #[must_use]
    pub const fn topic_not_found(topic_id: u64) -> Self {
        Self::TopicNotFound { topic_id }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Whether this error short-circuits retries instead of degrading to a skip
    #[must_use]
    pub const fn is_pruned(&self) -> bool {
        matches!(self, Self::PrunedHistory { .. })
    }
}

/// Result type alias for collector operations
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Convert from YAML parsing errors
impl From<serde_yaml::Error> for CollectorError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::malformed_response(format!("YAML parsing error: {err}"))
    }
}

/// Convert from timestamp parsing errors
impl From<chrono::ParseError> for CollectorError {
    fn from(err: chrono::ParseError) -> Self {
        Self::malformed_response(format!("Timestamp parsing error: {err}"))
    }
}

/// Convert from integer parsing errors
impl From<std::num::ParseIntError> for CollectorError {
    fn from(err: std::num::ParseIntError) -> Self {
        Self::malformed_response(format!("Integer parsing error: {err}"))
    }
}
