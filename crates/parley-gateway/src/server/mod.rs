//! Gateway server setup
//!
//! Wires the router, WebSocket handler, and state construction together.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use axum::{routing::get, Router};
use parley_common::{AppConfig, AppError, SessionTokens};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/gateway", get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize all dependencies and create `GatewayState`
pub async fn create_gateway_state(config: &AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = parley_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = parley_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    let tokens = Arc::new(SessionTokens::new(
        &config.session.secret,
        config.session.expiry_seconds,
    ));

    let users = Arc::new(parley_db::PgUserRepository::new(pool.clone()));
    let members = Arc::new(parley_db::PgMemberRepository::new(pool.clone()));
    let channels = Arc::new(parley_db::PgChannelRepository::new(pool));

    Ok(GatewayState::new(users, members, channels, tokens))
}

/// Run the gateway server
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!("Starting gateway server on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/gateway", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));

    let state = create_gateway_state(&config).await?;
    let app = create_app(state);

    run_server(app, addr).await
}
