/**
 * Server Initialization
 *
 * 1. Open the SQLite pool and apply migrations
 * 2. Build the application state around it
 * 3. Assemble the router
 *
 * `serve` then binds the configured address and runs until the process is
 * told to stop.
 */

use axum::Router;
use tokio::net::TcpListener;

use crate::backend::error::BackendResult;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::connect_database;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Open the database and wire every component
pub async fn build_state(config: AppConfig) -> BackendResult<AppState> {
    if config.uses_default_secret() {
        tracing::warn!("[Server] JWT_SECRET not set; using the development secret");
    }

    let pool = connect_database(&config.database_url, config.max_connections).await?;
    Ok(AppState::new(pool, config))
}

/// Router over an already built state
pub fn create_app(state: AppState) -> Router<()> {
    tracing::info!("[Server] Configuring routes");
    create_router(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: AppConfig) -> BackendResult<()> {
    let bind_addr = config.bind_addr;
    let state = build_state(config).await?;
    let app = create_app(state);

    let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
        tracing::error!("[Server] Failed to bind {}: {}", bind_addr, e);
        e
    })?;
    tracing::info!("[Server] Listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("[Server] Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("[Server] Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("[Server] Shutdown signal received");
}
