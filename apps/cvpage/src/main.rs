mod config;
mod editing;
mod errors;
mod export;
mod models;
mod page;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::editing::controller::CvController;
use crate::export::assets::{AssetSource, DirAssetSource, HttpAssetSource};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{JsonFileStore, MemoryStore, ProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; only malformed values fail here
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cvpage v{}", env!("CARGO_PKG_VERSION"));

    // Profile storage: one JSON entry on disk, or in memory when no path is set
    let store: Arc<dyn ProfileStore> = match &config.storage_path {
        Some(path) => {
            let store = JsonFileStore::new(path);
            info!("Profile storage at {}", store.path().display());
            Arc::new(store)
        }
        None => {
            warn!("CV_STORAGE_PATH is empty; edits will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Page-relative assets for export and the document fallback
    let assets: Arc<dyn AssetSource> = match &config.asset_base_url {
        Some(base) => {
            info!("Fetching page assets from {base}");
            Arc::new(HttpAssetSource::new(base.clone()))
        }
        None => {
            info!("Reading page assets from {}", config.public_dir.display());
            Arc::new(DirAssetSource::new(&config.public_dir))
        }
    };

    let controller = CvController::bootstrap(config.page_settings(), store, assets.clone())
        .await
        .into_shared();

    // Build app state
    let state = AppState {
        config: config.clone(),
        controller,
        assets,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
