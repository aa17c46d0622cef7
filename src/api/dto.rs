//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not plain
//! records. These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::Row;

/// Largest page a list endpoint returns
pub const MAX_PAGE_SIZE: usize = 500;

// ============================================
// LIST DTOs
// ============================================

/// Query string accepted by every list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive term matched against the record's text columns
    #[serde(default)]
    pub search: Option<String>,
    /// Exact match on the record's status column
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

impl ListParams {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn page_size(&self) -> usize {
        self.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub count: usize,
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for ListResponse<T> {
    fn from(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

// ============================================
// MUTATION DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitFormRequest {
    pub data: Row,
    #[serde(default)]
    pub source: Option<String>,
}

/// Body of `POST /jobs/:id/apply`; the job id comes from the path
#[derive(Debug, Deserialize)]
pub struct ApplyRequest {
    pub applicant_name: String,
    pub email: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PreferenceRequest {
    pub value: Value,
}

#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub key: String,
    pub value: Value,
}

// ============================================
// ANALYTICS DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct FunnelParams {
    /// Comma-separated event names, in funnel order
    pub steps: String,
}

#[derive(Debug, Deserialize)]
pub struct GroupParams {
    /// Lead column to group by
    #[serde(default = "default_group_field")]
    pub by: String,
}

fn default_group_field() -> String {
    "source".to_string()
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Backend status
    pub backend: String,
    /// Backend kind: rest or sqlite
    pub backend_kind: String,
    /// Open WebSocket connections
    pub ws_connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
