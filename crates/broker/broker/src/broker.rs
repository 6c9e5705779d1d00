//! Broker traits.
//!
//! The gateway treats the broker as a byte-message transport: events go out
//! as opaque bodies on a named topic, and consumers receive bodies from the
//! current end of a topic onward. Concrete transports (in-process channels,
//! Kafka, NATS) plug in behind these traits.

use async_trait::async_trait;

use crate::error::BrokerResult;

/// Trait for message broker backends.
///
/// The connection is established once at process startup and reused across
/// all publishes; `publish` never opens a connection and fails fast with
/// [`BrokerError::NotConnected`](crate::BrokerError::NotConnected) before
/// `connect` completes.
#[async_trait]
pub trait MessageBroker: Send + Sync {
    /// Establishes the broker connection.
    async fn connect(&self) -> BrokerResult<()>;

    /// Tears down the broker connection.
    async fn disconnect(&self) -> BrokerResult<()>;

    /// Publishes one opaque message body to a topic.
    ///
    /// Exactly one message per call; no retry is performed here. A failure
    /// means nothing was published and the caller decides whether to retry.
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> BrokerResult<()>;

    /// Opens a consumer positioned at the current end of the topic.
    ///
    /// Only messages published after the subscription are delivered;
    /// historical replay is not supported.
    async fn subscribe(&self, topic: &str) -> BrokerResult<Box<dyn BrokerConsumer>>;
}

/// A consumer bound to one topic.
///
/// Dropping the consumer unsubscribes it.
#[async_trait]
pub trait BrokerConsumer: Send {
    /// Receives the next message body.
    ///
    /// Returns `Ok(None)` when the topic is closed, and
    /// [`BrokerError::Lagged`](crate::BrokerError::Lagged) when the consumer
    /// fell behind and messages were skipped; after a lag the consumer
    /// continues from the current edge of the topic.
    async fn recv(&mut self) -> BrokerResult<Option<Vec<u8>>>;
}
