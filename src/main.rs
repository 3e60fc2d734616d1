//! Binary entry point - wires configuration, database, and the REST API.

use std::sync::Arc;

use dotenvy::dotenv;
use problem2profit::{
    api::{self, ApiState},
    config::{AppConfig, create_connection, create_tables},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = AppConfig::from_env()
        .inspect_err(|e| error!("Critical error loading application configuration: {e}"))?;

    // 4. Initialize database and create any missing tables
    let db = create_connection(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;
    create_tables(&db).await?;

    // 5. Serve the REST API
    let addr = format!("0.0.0.0:{}", app_config.api_port);
    let state = Arc::new(ApiState {
        db,
        config: app_config,
    });
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
