//! HTTP server for the gamification API.

pub mod routes;

use crate::gamification::ProgressEngine;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers.
pub struct AppState {
    pub engine: ProgressEngine,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(engine: ProgressEngine) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
        }
    }
}

/// Build the full API router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::gamification_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server.
pub async fn run(state: AppState, bind_addr: &str) -> Result<()> {
    let app = app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
