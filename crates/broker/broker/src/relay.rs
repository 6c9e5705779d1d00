//! Stream relay sessions.
//!
//! A session pairs one broker consumer with one open HTTP response for the
//! lifetime of that connection. A spawned forwarding task moves message
//! bodies from the consumer into a bounded frame channel; the HTTP layer
//! drains the channel. Dropping the session aborts the task, which releases
//! the consumer. Closing is terminal: a dropped client opens a new session.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::broker::{BrokerConsumer, MessageBroker};
use crate::error::{BrokerError, BrokerResult};

/// Opens stream sessions over a shared broker.
pub struct StreamRelay {
    broker: Arc<dyn MessageBroker>,
    buffer: usize,
}

impl StreamRelay {
    /// Creates a relay with the given per-session frame buffer capacity.
    pub fn new(broker: Arc<dyn MessageBroker>, buffer: usize) -> Self {
        Self { broker, buffer }
    }

    /// Subscribes a consumer to the subject's topic and starts forwarding.
    ///
    /// The consumer is positioned at the current end of the topic; only
    /// messages published after the session opens are forwarded.
    pub async fn open_session(&self, subject: &str) -> BrokerResult<StreamSession> {
        let consumer = self.broker.subscribe(subject).await?;
        let id = uuid::Uuid::new_v4().to_string();

        let (tx, rx) = mpsc::channel(self.buffer.max(1));
        let forwarder = tokio::spawn(forward(consumer, tx, subject.to_string(), id.clone()));

        tracing::info!(session = %id, subject, "stream session opened");

        Ok(StreamSession {
            id,
            subject: subject.to_string(),
            frames: rx,
            forwarder,
        })
    }
}

/// Forwarding loop: consumer -> bounded frame channel.
///
/// Fire-and-forget relative to the consumer: a full frame channel drops the
/// frame instead of stalling consumption, so a slow response sink cannot
/// grow memory without bound.
async fn forward(
    mut consumer: Box<dyn BrokerConsumer>,
    tx: mpsc::Sender<Vec<u8>>,
    subject: String,
    session: String,
) {
    let mut dropped: u64 = 0;

    loop {
        match consumer.recv().await {
            Ok(Some(frame)) => match tx.try_send(frame) {
                Ok(()) => dropped = 0,
                Err(TrySendError::Full(_)) => {
                    if dropped == 0 {
                        tracing::warn!(session = %session, subject = %subject, "frame buffer full, dropping");
                    }
                    dropped += 1;
                }
                // Client side of the session is gone.
                Err(TrySendError::Closed(_)) => break,
            },
            Ok(None) => {
                tracing::info!(session = %session, subject = %subject, "topic closed, ending session");
                break;
            }
            Err(BrokerError::Lagged(n)) => {
                tracing::warn!(session = %session, subject = %subject, skipped = n, "consumer lagged");
            }
            Err(e) => {
                tracing::error!(session = %session, subject = %subject, error = %e, "consumer error, ending session");
                break;
            }
        }
    }
}

/// A live pairing of one streaming response with one broker consumer.
///
/// Yields message bodies in the order the consumer received them. Dropping
/// the session aborts the forwarding task and releases the consumer.
#[derive(Debug)]
pub struct StreamSession {
    id: String,
    subject: String,
    frames: mpsc::Receiver<Vec<u8>>,
    forwarder: JoinHandle<()>,
}

impl StreamSession {
    /// Unique session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subject this session is tailing.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Receives the next frame; `None` once the session has ended.
    pub async fn next_frame(&mut self) -> Option<Vec<u8>> {
        self.frames.recv().await
    }

    /// Ends the session, waiting for the consumer to be released.
    pub async fn close(mut self) {
        self.forwarder.abort();
        let _ = (&mut self.forwarder).await;
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

impl tokio_stream::Stream for StreamSession {
    type Item = Vec<u8>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().frames.poll_recv(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::ChannelBroker;
    use std::time::Duration;

    async fn connected_broker() -> Arc<ChannelBroker> {
        let broker = Arc::new(ChannelBroker::new("relay-test"));
        broker.connect().await.unwrap();
        broker
    }

    #[tokio::test]
    async fn test_frames_arrive_in_publish_order() {
        let broker = connected_broker().await;
        let relay = StreamRelay::new(broker.clone(), 16);

        let mut session = relay.open_session("orders").await.unwrap();

        for body in [b"one".to_vec(), b"two".to_vec(), b"three".to_vec()] {
            broker.publish("orders", body).await.unwrap();
        }

        assert_eq!(session.next_frame().await, Some(b"one".to_vec()));
        assert_eq!(session.next_frame().await, Some(b"two".to_vec()));
        assert_eq!(session.next_frame().await, Some(b"three".to_vec()));
    }

    #[tokio::test]
    async fn test_close_releases_consumer() {
        let broker = connected_broker().await;
        let relay = StreamRelay::new(broker.clone(), 16);

        let mut session = relay.open_session("orders").await.unwrap();
        assert_eq!(broker.subscriber_count("orders").await, 1);

        broker.publish("orders", b"one".to_vec()).await.unwrap();
        broker.publish("orders", b"two".to_vec()).await.unwrap();

        assert_eq!(session.next_frame().await, Some(b"one".to_vec()));
        assert_eq!(session.next_frame().await, Some(b"two".to_vec()));

        // Disconnect after the second frame: the consumer is gone before any
        // further message could be processed.
        session.close().await;
        assert_eq!(broker.subscriber_count("orders").await, 0);

        broker.publish("orders", b"four".to_vec()).await.unwrap();
        assert_eq!(broker.subscriber_count("orders").await, 0);
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let broker = connected_broker().await;
        let relay = StreamRelay::new(broker.clone(), 16);

        let mut a = relay.open_session("orders").await.unwrap();
        let mut b = relay.open_session("orders").await.unwrap();
        assert_ne!(a.id(), b.id());

        broker.publish("orders", b"body".to_vec()).await.unwrap();

        assert_eq!(a.next_frame().await, Some(b"body".to_vec()));
        assert_eq!(b.next_frame().await, Some(b"body".to_vec()));

        a.close().await;
        assert_eq!(broker.subscriber_count("orders").await, 1);
        b.close().await;
        assert_eq!(broker.subscriber_count("orders").await, 0);
    }

    #[tokio::test]
    async fn test_full_buffer_drops_frames_instead_of_stalling() {
        let broker = connected_broker().await;
        let relay = StreamRelay::new(broker.clone(), 2);

        let mut session = relay.open_session("orders").await.unwrap();

        // Publish more than the buffer holds while the sink reads nothing.
        for i in 0..10u8 {
            broker.publish("orders", vec![i]).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The oldest frames are buffered; the overflow was dropped.
        assert_eq!(session.next_frame().await, Some(vec![0]));
        assert_eq!(session.next_frame().await, Some(vec![1]));

        let pending =
            tokio::time::timeout(Duration::from_millis(50), session.next_frame()).await;
        assert!(pending.is_err(), "dropped frames must not be delivered late");
    }

    #[tokio::test]
    async fn test_open_session_requires_connected_broker() {
        let broker = Arc::new(ChannelBroker::new("relay-test"));
        let relay = StreamRelay::new(broker, 16);

        let err = relay.open_session("orders").await.unwrap_err();
        assert!(matches!(err, BrokerError::NotConnected));
    }
}
