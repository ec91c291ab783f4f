//! Process bootstrap for the fenestra API server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use fenestra_api::{app, validate_upload_dir, ApiConfig, AppState};
use fenestra_core::defaults::{BIND_ADDR, ENV_BIND_ADDR, ENV_DATABASE_URL};
use fenestra_db::Database;
use fenestra_vision::WindowAnalyzer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let database_url = std::env::var(ENV_DATABASE_URL)
        .map_err(|_| anyhow::anyhow!("{} must be set", ENV_DATABASE_URL))?;

    let config = ApiConfig::from_env();

    // Catch filesystem problems before the first upload arrives.
    validate_upload_dir(&config.upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Upload directory validation failed: {}", e))?;

    let db = Database::connect(&database_url).await?;
    fenestra_db::run_migrations(&db.pool).await?;

    let analyzer = WindowAnalyzer::from_env();
    if analyzer.is_enabled() {
        info!(subsystem = "api", op = "startup", "Vision analysis enabled");
    }

    let state = AppState {
        db,
        analyzer: Arc::new(analyzer),
        config: Arc::new(config),
    };

    let addr = std::env::var(ENV_BIND_ADDR).unwrap_or_else(|_| BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        subsystem = "api",
        op = "startup",
        addr = %addr,
        version = env!("CARGO_PKG_VERSION"),
        "fenestra API listening"
    );

    axum::serve(listener, app(state)).await?;

    Ok(())
}
