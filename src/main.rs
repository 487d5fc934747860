//! YogaFlow - Yoga Practice Tracking Backend
//!
//! Main entry point for the service.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use yogaflow::gamification::ProgressEngine;
use yogaflow::server::{self, AppState};
use yogaflow::storage::{config, Database};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting YogaFlow v{}", env!("CARGO_PKG_VERSION"));

    let app_config = config::load_config()?;
    let db_path = app_config.database_path();
    tracing::info!("Opening database at {}", db_path.display());

    let db = Database::open(&db_path)?;
    let engine = ProgressEngine::new(db);

    server::run(AppState::new(engine), &app_config.server.bind_addr).await
}
