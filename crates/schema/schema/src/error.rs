//! Schema error types.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error type for registry and validator operations.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The registry could not be reached.
    #[error("Schema registry unavailable: {0}")]
    RegistryUnavailable(String),

    /// No schema is registered for the subject.
    #[error("No schema found for subject '{0}'")]
    SchemaNotFound(String),

    /// The schema document itself is malformed and cannot be compiled.
    #[error("Schema for subject '{subject}' failed to compile: {reason}")]
    SchemaCompileError { subject: String, reason: String },

    /// The registry responded with something that is not a schema document.
    #[error("Invalid registry response for subject '{subject}': {reason}")]
    InvalidDocument { subject: String, reason: String },
}

impl SchemaError {
    /// True when retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SchemaError::RegistryUnavailable(_))
    }
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for SchemaError {
    fn from(err: reqwest::Error) -> Self {
        SchemaError::RegistryUnavailable(err.to_string())
    }
}
