//! Agency API Server
//!
//! Run with: cargo run --bin agency
//!
//! # Configuration
//!
//! Read from `config.toml` (see `agency-cli config`), then overridden by:
//! - `AGENCY_BACKEND`: `rest` (hosted backend) or `sqlite` (local file)
//! - `AGENCY_BACKEND_URL` / `AGENCY_BACKEND_API_KEY`: hosted backend
//! - `AGENCY_SQLITE_PATH`: local database file
//! - `AGENCY_API_HOST` / `AGENCY_API_PORT`: listen address (default 0.0.0.0:8090)
//! - `AGENCY_PREFERENCES_PATH`: site preferences file
//! - `AGENCY_LOG_LEVEL` / `AGENCY_LOG_FORMAT`: `pretty` or `json`
//! - `RUST_LOG`: takes precedence over the configured level

use agency::api::{serve, AppState};
use agency::config::{BackendKind, Config, LoggingConfig};
use agency::store::{RestStore, SqliteStore, Store};
use agency::theme::PreferenceStore;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_default();
    init_tracing(&config.logging);

    tracing::info!("Starting Agency API server v{}", env!("CARGO_PKG_VERSION"));

    let store = open_store(&config)?;
    match store.ping().await {
        Ok(()) => tracing::info!(backend = store.kind(), "Backend connection verified"),
        Err(e) => tracing::warn!(backend = store.kind(), error = %e, "Backend not reachable yet"),
    }

    let preferences = PreferenceStore::open(Path::new(&config.preferences.path))?;
    tracing::info!(
        path = %config.preferences.path,
        entries = preferences.len(),
        "Preferences loaded"
    );

    let state = AppState::new(store, config.api.clone(), preferences)
        .with_live_contacts()
        .await?;

    serve(state, &config.api).await?;

    tracing::info!("Agency API server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("agency={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format.eq_ignore_ascii_case("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn open_store(config: &Config) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    let store: Arc<dyn Store> = match config.backend.kind {
        BackendKind::Rest => {
            tracing::info!(url = %config.backend.url, "Using hosted backend");
            if config.backend.api_key.is_empty() {
                tracing::warn!("AGENCY_BACKEND_API_KEY is not set; requests will be anonymous");
            }
            Arc::new(RestStore::new(config.backend.rest_store_config())?)
        }
        BackendKind::Sqlite => {
            tracing::info!(path = %config.backend.sqlite_path, "Using local SQLite backend");
            Arc::new(SqliteStore::open(Path::new(&config.backend.sqlite_path))?)
        }
    };
    Ok(store)
}
