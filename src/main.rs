//! Diabetes Readmission Predictor API
//!
//! Serves a pre-trained readmission classifier over HTTP.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     READMISSION API                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /predict                                               │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  ┌──────────┐   ┌──────────┐   ┌────────────┐   ┌─────────┐ │
//! │  │ Validate │──▶│ Features │──▶│ Preprocess │──▶│ Decide  │ │
//! │  │ (serde)  │   │ (log1p)  │   │ + Classify │   │ (tiers) │ │
//! │  └──────────┘   └──────────┘   └─────┬──────┘   └─────────┘ │
//! │                                      │                       │
//! │                             ┌────────┴────────┐              │
//! │                             │  ArtifactStore  │              │
//! │                             │  (load once)    │              │
//! │                             └─────────────────┘              │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod artifacts;
mod config;
mod decision;
mod error;
mod extract;
mod features;
mod handlers;
mod inference;
mod models;
mod stats;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use artifacts::{ArtifactPaths, ArtifactStore};
use config::{Config, LogFormat};
use stats::PredictionStats;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_tracing(config.log_format);

    tracing::info!("Readmission API starting...");
    tracing::info!("Environment: {}", config.environment);

    // Load artifacts before accepting traffic
    let store = ArtifactStore::new(
        ArtifactPaths::from_config(&config),
        config.strict_feature_schema,
    );
    if let Err(e) = store.load() {
        tracing::error!(
            dir = %store.paths().dir.display(),
            error = %e,
            "Failed to load model artifacts"
        );
        return Err(e).context("failed to load model artifacts");
    }

    // Build application state
    let state = AppState {
        artifacts: Arc::new(store),
        stats: Arc::new(PredictionStats::new()),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state)?;

    // Start server
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "readmission_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub artifacts: Arc<ArtifactStore>,
    pub stats: Arc<PredictionStats>,
    pub config: Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> anyhow::Result<Router> {
    let origin: HeaderValue = state
        .config
        .cors_origin
        .parse()
        .with_context(|| format!("invalid CORS origin: {}", state.config.cors_origin))?;

    let router = Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::check))
        .route("/model", get(handlers::model::info))
        .route("/predict", post(handlers::predict::predict))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_credentials(true)
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request()),
        )
        .with_state(state);

    Ok(router)
}
