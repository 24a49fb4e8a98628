//! # edu-social
//!
//! Student social network backend with authenticated real-time group chat.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use edu_social::config::Settings;
use edu_social::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the subscriber reads RUST_LOG / LOG_FORMAT
    let _ = dotenvy::dotenv();

    edu_social::telemetry::init_tracing();

    info!("Starting edu-social...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    // Build and run the application
    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
