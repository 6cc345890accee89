//! OCR Engine Server
//!
//! A single-endpoint HTTP service: POST an image to `/process-ocr` and get
//! back the text the OCR engine found in it, as flat `{text, confidence}`
//! records. The engine itself runs behind a pluggable backend (helper
//! command or HTTP sidecar) configured at startup.

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod ocr;
mod routes;
mod staging;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ocr_engine_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Starting OCR Engine Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Engine backend: {:?}", config.engine.backend);

    // The engine keeps model caches under $HOME-style directories; point
    // all of them at a local folder before the engine is constructed.
    config::redirect_engine_cache(&config.engine.cache_dir)
        .context("failed to prepare engine cache directory")?;
    tracing::info!("Engine cache directory: {}", config.engine.cache_dir.display());

    // Create application state (constructs the engine singleton)
    let app_state = AppState::new(config).context("failed to initialize OCR engine")?;
    let server = app_state.config().server.clone();

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = routes::router()
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state);

    // Start server with graceful shutdown
    let host = server.host.parse().context("invalid SERVER_HOST address")?;
    let addr = SocketAddr::new(host, server.port);
    tracing::info!("OCR Engine Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
