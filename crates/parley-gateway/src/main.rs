//! Gateway server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p parley-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use parley_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Gateway failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting parley gateway...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.gateway.port,
        "Configuration loaded"
    );

    parley_gateway::run(config).await?;

    Ok(())
}
