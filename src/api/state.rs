//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

pub use crate::config::ApiConfig;
use crate::dashboard::LiveSnapshot;
use crate::models::{ContactSubmission, Record};
use crate::repo::{RepoResult, Repositories, Repository};
use crate::store::Store;
use crate::theme::PreferenceStore;
use crate::websocket::{ConnectionHub, HubConfig};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Backend every repository reads and writes through
    pub store: Arc<dyn Store>,
    /// Typed repositories sharing the store and change feed
    pub repos: Repositories,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// WebSocket connection hub for change notifications
    pub ws_hub: Arc<ConnectionHub>,
    /// Site preferences and theme overrides
    pub preferences: Arc<RwLock<PreferenceStore>>,
    /// Contact inbox kept fresh by insert notifications (optional)
    pub live_contacts: Option<Arc<LiveSnapshot<ContactSubmission>>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ApiConfig, preferences: PreferenceStore) -> Self {
        let hub_config = HubConfig {
            max_connections: config.max_ws_connections,
            ..HubConfig::default()
        };
        let ws_hub = Arc::new(ConnectionHub::new(hub_config));
        let repos = Repositories::new(Arc::clone(&store), Some(Arc::clone(&ws_hub)));

        Self {
            store,
            repos,
            config: Arc::new(config),
            start_time: Instant::now(),
            ws_hub,
            preferences: Arc::new(RwLock::new(preferences)),
            live_contacts: None,
        }
    }

    /// Start the live contact snapshot used by the dashboard
    pub async fn with_live_contacts(mut self) -> RepoResult<Self> {
        let snapshot = LiveSnapshot::start(self.repos.contacts.clone(), &self.ws_hub).await?;
        self.live_contacts = Some(Arc::new(snapshot));
        Ok(self)
    }

    /// Repository for any table, sharing this state's store and hub
    pub fn repo<T: Record>(&self) -> Repository<T> {
        Repository::new(Arc::clone(&self.store), Some(Arc::clone(&self.ws_hub)))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Get WebSocket connection count
    pub async fn ws_connection_count(&self) -> usize {
        self.ws_hub.connection_count().await
    }
}
