//! RobotReplay Server
//!
//! Replays optimized warehouse robot routes over HTTP and SSE

use anyhow::Result;
use rr_server::{api, config::ServerConfig, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting RobotReplay Server");

    let config = ServerConfig::from_env()?;
    let optimizer = config.build_optimizer()?;
    info!("Using {} optimizer", optimizer.name());

    // Create application state
    let state = state::AppState::new(optimizer);

    // Build the router
    let app = api::create_router(state);

    // Start server
    info!("Server listening on http://{}", config.bind);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
