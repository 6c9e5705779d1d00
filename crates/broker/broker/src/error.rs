//! Broker error types.

use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Error type for broker operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker connection has not been established (or was torn down).
    #[error("Broker not connected")]
    NotConnected,

    /// The broker rejected or failed a publish.
    #[error("Publish failed: {0}")]
    Publish(String),

    /// A consumer could not subscribe to the topic.
    #[error("Subscribe failed: {0}")]
    Subscribe(String),

    /// A consumer fell behind and skipped messages.
    #[error("Consumer lagged, skipped {0} messages")]
    Lagged(u64),

    /// The broker connection closed underneath an operation.
    #[error("Broker connection closed")]
    Closed,
}

impl BrokerError {
    /// True when retrying the same request later could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, BrokerError::Lagged(_))
    }
}
