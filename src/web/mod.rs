//! HTTP surface: image generation, static pages and the balance pass-through.

use std::num::NonZeroU16;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::services::ServeFile;
use tracing::{error, info};

use crate::capture::CaptureService;
use crate::config::BalanceConfig;
use crate::provider::ImageProvider;

mod balance;
mod captures;
mod generate;
mod prelude;

use balance::balance_handler;
use captures::capture_status_handler;
use generate::generate_handler;

/// Shared handles every request handler works with, built once at startup.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn ImageProvider>,
    captures: CaptureService,
    http: reqwest::Client,
    balance: BalanceConfig,
    static_dir: PathBuf,
}

impl AppState {
    /// Bundles the injected clients and settings.
    pub fn new(
        provider: Arc<dyn ImageProvider>,
        captures: CaptureService,
        http: reqwest::Client,
        balance: BalanceConfig,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            captures,
            http,
            balance,
            static_dir: static_dir.into(),
        }
    }

    /// The capture service, for draining at shutdown.
    pub fn captures(&self) -> &CaptureService {
        &self.captures
    }
}

fn static_file(dir: &Path, name: &str) -> ServeFile {
    ServeFile::new(dir.join(name))
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route_service("/", static_file(&state.static_dir, "index.html"))
        .route_service(
            "/inprogress.gif",
            static_file(&state.static_dir, "inprogress.gif"),
        )
        .route("/generate", post(generate_handler))
        .route("/balance", get(balance_handler))
        .route("/captures/{key}", get(capture_status_handler))
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Serves the application until Ctrl-C, then waits for running captures.
pub async fn setup_server(
    listen_addr: &str,
    port: NonZeroU16,
    state: AppState,
) -> Result<(), anyhow::Error> {
    let captures = state.captures().clone();
    let app = create_router(state);

    let addr = format!("{}:{}", listen_addr, port);
    info!("Starting server on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
    }
    captures.drain().await;
    Ok(())
}
