/**
 * peerchat Server Entry Point
 *
 * Loads `.env`, reads configuration, initializes tracing and serves the
 * HTTP/WebSocket API until Ctrl-C.
 */

use tracing_subscriber::EnvFilter;

use peerchat::backend::server::serve;
use peerchat::shared::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    let config = AppConfig::load(None)?;

    let env_filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|e| {
        eprintln!("[STARTUP] Invalid log filter {:?}: {}", config.log_filter, e);
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(
        "[STARTUP] peerchat {} starting on {}",
        env!("CARGO_PKG_VERSION"),
        config.bind_addr
    );

    serve(config).await?;
    Ok(())
}
