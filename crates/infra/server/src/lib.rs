//! # Event Gateway Server
//!
//! Composition root for the event ingestion gateway: wires the schema
//! cache, broker, and stream relay behind the HTTP boundary and maps
//! component failures to HTTP statuses in one place.

mod config;
mod error;
mod routes;

pub use config::{
    load_config, BrokerConfig, ConfigError, GatewayConfig, RegistryConfig, ServerConfig,
    StreamConfig,
};
pub use error::ApiError;
pub use routes::gateway_routes;

use std::sync::Arc;

use event_gateway_broker::{ChannelBroker, MessageBroker, StreamRelay};
use event_gateway_schema::{HttpSchemaRegistry, SchemaCache};

/// Shared state cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Compiled-validator cache over the schema registry.
    pub cache: Arc<SchemaCache>,
    /// Broker connection shared by all ingestion requests.
    pub broker: Arc<dyn MessageBroker>,
    /// Relay opening one consumer per streaming request.
    pub relay: Arc<StreamRelay>,
}

/// Runs the gateway until shutdown.
///
/// Connects the broker before opening the listener; a connect failure is
/// fatal and the gateway serves no traffic at all rather than serving
/// degraded. On shutdown the broker is disconnected after the listener
/// closes.
pub async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = Arc::new(HttpSchemaRegistry::new(
        config.registry.base_url.as_str(),
        config.registry.timeout(),
    ));

    let broker: Arc<dyn MessageBroker> = Arc::new(ChannelBroker::with_capacity(
        config.broker.client_id.as_str(),
        config.broker.topic_capacity,
    ));
    broker.connect().await?;

    let state = AppState {
        cache: Arc::new(SchemaCache::new(registry, config.registry.cache_ttl())),
        broker: broker.clone(),
        relay: Arc::new(StreamRelay::new(broker.clone(), config.stream.buffer)),
    };

    let app = gateway_routes(state, config.server.max_body_bytes);

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    tracing::info!(port = config.server.port, "event gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down event gateway");
    broker.disconnect().await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
