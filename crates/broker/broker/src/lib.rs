//! # Event Gateway Broker
//!
//! Broker transport for the event gateway:
//! - [`MessageBroker`] / [`BrokerConsumer`] traits over a byte-message
//!   transport with connect/disconnect lifecycle
//! - [`ChannelBroker`], the in-process implementation backed by per-topic
//!   broadcast channels
//! - [`StreamRelay`] / [`StreamSession`], pairing one broker consumer with
//!   one streaming HTTP response
//!
//! ## Example
//!
//! ```rust,ignore
//! use event_gateway_broker::{ChannelBroker, MessageBroker, StreamRelay};
//!
//! let broker = Arc::new(ChannelBroker::new("event-gateway"));
//! broker.connect().await?;
//!
//! broker.publish("orders", payload_bytes).await?;
//!
//! let relay = StreamRelay::new(broker.clone(), 64);
//! let mut session = relay.open_session("orders").await?;
//! while let Some(frame) = session.next_frame().await {
//!     // forward frame to the client
//! }
//! ```

mod broker;
mod channel;
mod error;
mod relay;

pub use broker::{BrokerConsumer, MessageBroker};
pub use channel::ChannelBroker;
pub use error::{BrokerError, BrokerResult};
pub use relay::{StreamRelay, StreamSession};
