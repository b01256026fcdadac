//! Lead Server
//!
//! HTTP API for tracking sales leads through their pipeline: leads, the
//! sales agents assigned to them, comment threads, and pipeline reports.

pub mod api;
pub mod config;
pub mod error;
pub mod reporting;
pub mod state;
pub mod validation;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use lead_store::LeadStore;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::state::{AppState, create_shared_state};

/// Creates the application router with all routes configured.
pub fn create_app<S: LeadStore + 'static>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    api::create_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Creates the application state around the given store.
pub fn create_state<S: LeadStore>(store: S) -> Arc<AppState<S>> {
    create_shared_state(store)
}

/// Seeds the tag vocabulary and serves the API until the listener fails.
pub async fn serve<S: LeadStore + 'static>(config: Config, store: S) -> anyhow::Result<()> {
    let seeded = store.seed_tags(&config.tags).await?;
    if seeded > 0 {
        tracing::info!(count = seeded, "Seeded tag vocabulary");
    }

    let addr: SocketAddr = config.server_addr().parse()?;
    let app = create_app(create_state(store));

    tracing::info!(addr = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Initializes tracing with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
