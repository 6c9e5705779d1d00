//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listener configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Schema registry configuration.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Broker configuration.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Stream relay configuration.
    #[serde(default)]
    pub stream: StreamConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
    /// Log level.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            host: "0.0.0.0".to_string(),
            max_body_bytes: 1024 * 1024, // 1 MiB
            log_level: "info".to_string(),
        }
    }
}

/// Schema registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry service.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// TTL for cached validators in milliseconds, shared by all subjects.
    pub cache_ttl_ms: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_ms: 5_000,
            cache_ttl_ms: 300_000, // 5 minutes
        }
    }
}

impl RegistryConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}

/// Broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// Per-topic buffer capacity.
    pub topic_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            client_id: "event-gateway".to_string(),
            topic_capacity: 256,
        }
    }
}

/// Stream relay configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Buffered frames per stream session before frames are dropped.
    pub buffer: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self { buffer: 64 }
    }
}

/// Loads configuration from a TOML file.
pub fn load_config(path: &str) -> Result<GatewayConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
