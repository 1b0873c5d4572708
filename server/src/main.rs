//! Quadro Server - HR administration backend.
//!
//! All application state lives as JSON files versioned in a remote Git
//! repository, reached through the hosting provider's contents API. The
//! sync subsystem keeps a local mirror of every collection, queues writes
//! that fail to reach the remote, and reconciles local and remote copies
//! once per process on a background task.

mod auth;
mod cache;
mod config;
mod error;
mod routes;
mod sync;

use crate::auth::SessionStore;
use crate::config::{Config, SharedConfig};
use crate::sync::{spawn_startup_sync, GithubStore, SyncService};
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub sync: Arc<SyncService>,
    pub sessions: Arc<SessionStore>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quadro_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = SharedConfig::new(Config::from_env()?);

    let snapshot = config.current();
    tracing::info!(
        "Starting Quadro Server on {}:{} (remote {}/{}@{})",
        snapshot.host,
        snapshot.port,
        snapshot.remote.owner,
        snapshot.remote.repo,
        snapshot.remote.branch,
    );
    if snapshot.remote.token.is_none() {
        tracing::warn!("no remote write token configured; writes will be queued");
    }

    // Build application state
    let remote = Arc::new(GithubStore::new(config.clone()));
    let sync = Arc::new(SyncService::new(remote, config.clone()));
    let state = AppState {
        config,
        sync: sync.clone(),
        sessions: Arc::new(SessionStore::new(SESSION_TTL)),
    };

    // Reconcile local and remote copies without gating server readiness
    spawn_startup_sync(sync);

    // Build router
    let app = Router::new()
        .merge(routes::create_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", snapshot.host, snapshot.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
