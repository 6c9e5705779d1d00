//! Event gateway binary.

use event_gateway_server::{load_config, GatewayConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration; defaults apply when no file is given
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&path)?,
        None => GatewayConfig::default(),
    };

    event_gateway_server::run(config).await
}
