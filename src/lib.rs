//! # Agency
//!
//! Back-office service for a digital marketing agency: the public site's
//! forms and contact wizard, and the admin views over campaigns, A/B
//! experiments, leads, hiring, media and theming. All data lives in a hosted
//! database reached over its REST interface (or a local SQLite file).
//!
//! ## Modules
//!
//! - [`store`]: Table-level access to the backend (REST or SQLite)
//! - [`models`]: Typed rows and their validation rules
//! - [`repo`]: Typed repositories and multi-step workflows
//! - [`analytics`]: Campaign, funnel, experiment, form and segment reports
//! - [`wizard`]: The four-step contact wizard
//! - [`theme`]: Theme CSS variables and persisted site preferences
//! - [`dashboard`]: Live snapshots refreshed by change notifications
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Change notifications for connected dashboards
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use agency::models::{LeadStatus, NewLead};
//! use agency::repo::Repositories;
//! use agency::store::{SqliteStore, Store};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory()?);
//!     let repos = Repositories::new(store, None);
//!
//!     let lead = repos
//!         .leads
//!         .create(&NewLead {
//!             email: "ann@shop.io".to_string(),
//!             name: Some("Ann".to_string()),
//!             source: "webinar".to_string(),
//!             score: 60,
//!             status: LeadStatus::New,
//!             tags: vec!["ecommerce".to_string()],
//!         })
//!         .await?;
//!
//!     println!("Captured lead {}", lead.id);
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod repo;
pub mod search;
pub mod store;
pub mod theme;
pub mod websocket;
pub mod wizard;

// Re-export top-level types for convenience
pub use store::{Query, RestStore, RestStoreConfig, Row, SqliteStore, Store, StoreError, StoreResult, Table};

pub use models::{Record, Validate, ValidationError};

pub use repo::{RepoError, RepoResult, Repositories, Repository};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::Config;
