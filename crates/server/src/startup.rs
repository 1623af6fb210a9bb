use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use configs::AppConfig;
use service::{queue::PersistentQueueStore, runtime, QueueService};

use crate::errors::StartupError;
use crate::routes::{self, AppState};

/// Mirrors the request origin and allows credentials, so any browser client can call the API.
pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn parse_bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let addr = cfg.server.bind_addr();
    addr.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {addr}: {e}")))
}

/// Open the queue store and wrap it in handler state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<(AppState, PersistentQueueStore)> {
    let path = cfg.queue_storage.resolved_path();
    runtime::ensure_env(&path).await?;
    let store = PersistentQueueStore::open(path).await;
    let queue: Arc<dyn QueueService> = Arc::new(store.clone());
    Ok((AppState::new(queue), store))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down");
}

/// Public entry: load config, build the app and serve until Ctrl+C, then
/// flush the queue snapshot.
pub async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::load_and_validate()
        .map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let (state, store) = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = parse_bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr: addr.to_string(), source })?;
    info!(%addr, snapshot = %store.path().display(), "queue server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    match store.flush().await {
        Ok(()) => info!(count = store.status().await.count, "queue snapshot flushed"),
        Err(e) => error!(error = %e, "final queue flush failed"),
    }
    Ok(())
}
