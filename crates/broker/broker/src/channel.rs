//! In-process broker backed by per-topic broadcast channels.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio::sync::RwLock;

use crate::broker::{BrokerConsumer, MessageBroker};
use crate::error::{BrokerError, BrokerResult};

const DEFAULT_TOPIC_CAPACITY: usize = 256;

/// In-process [`MessageBroker`] implementation.
///
/// One broadcast channel per topic; subscribers attach at the current end
/// of the topic and receive only messages published afterwards. Publishing
/// to a topic with no subscribers succeeds and the message is discarded,
/// as delivery to absent consumers is the broker's concern, not the
/// publisher's.
pub struct ChannelBroker {
    client_id: String,
    topic_capacity: usize,
    connected: AtomicBool,
    topics: RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl ChannelBroker {
    /// Creates a broker identified by `client_id` with the default
    /// per-topic buffer capacity.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_capacity(client_id, DEFAULT_TOPIC_CAPACITY)
    }

    /// Creates a broker with a custom per-topic buffer capacity.
    pub fn with_capacity(client_id: impl Into<String>, topic_capacity: usize) -> Self {
        Self {
            client_id: client_id.into(),
            topic_capacity,
            connected: AtomicBool::new(false),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// True once `connect` has completed and before `disconnect`.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Number of live consumers on a topic.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let topics = self.topics.read().await;
        topics.get(topic).map(|tx| tx.receiver_count()).unwrap_or(0)
    }

    async fn topic_sender(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        {
            let topics = self.topics.read().await;
            if let Some(tx) = topics.get(topic) {
                return tx.clone();
            }
        }

        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.topic_capacity.max(1)).0)
            .clone()
    }
}

#[async_trait]
impl MessageBroker for ChannelBroker {
    async fn connect(&self) -> BrokerResult<()> {
        self.connected.store(true, Ordering::SeqCst);
        tracing::info!(client_id = %self.client_id, "broker connected");
        Ok(())
    }

    async fn disconnect(&self) -> BrokerResult<()> {
        self.connected.store(false, Ordering::SeqCst);
        tracing::info!(client_id = %self.client_id, "broker disconnected");
        Ok(())
    }

    async fn publish(&self, topic: &str, payload: Vec<u8>) -> BrokerResult<()> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }

        let sender = self.topic_sender(topic).await;
        // A send error only means no subscriber is currently attached.
        let _ = sender.send(payload);
        Ok(())
    }

    async fn subscribe(&self, topic: &str) -> BrokerResult<Box<dyn BrokerConsumer>> {
        if !self.is_connected() {
            return Err(BrokerError::NotConnected);
        }

        let sender = self.topic_sender(topic).await;
        Ok(Box::new(ChannelConsumer {
            rx: sender.subscribe(),
        }))
    }
}

/// Consumer over one topic's broadcast channel.
struct ChannelConsumer {
    rx: broadcast::Receiver<Vec<u8>>,
}

#[async_trait]
impl BrokerConsumer for ChannelConsumer {
    async fn recv(&mut self) -> BrokerResult<Option<Vec<u8>>> {
        match self.rx.recv().await {
            Ok(payload) => Ok(Some(payload)),
            Err(broadcast::error::RecvError::Closed) => Ok(None),
            Err(broadcast::error::RecvError::Lagged(n)) => Err(BrokerError::Lagged(n)),
        }
    }
}
