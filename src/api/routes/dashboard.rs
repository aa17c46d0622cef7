//! Dashboard Routes
//!
//! - GET /api/v1/dashboard - Headline counts for the back-office home
//! - GET /api/v1/dashboard/contacts - Contact inbox, refreshed on insert

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::dashboard::DashboardOverview;
use crate::models::ContactSubmission;

#[derive(Debug, Serialize)]
pub struct ContactFeed {
    pub count: usize,
    pub items: Vec<ContactSubmission>,
    pub refreshed_at: DateTime<Utc>,
    /// Times the snapshot re-queried; 0 when served without a live snapshot
    pub refresh_count: u64,
}

/// GET /api/v1/dashboard
pub async fn overview(State(state): State<Arc<AppState>>) -> ApiResult<Json<DashboardOverview>> {
    Ok(Json(DashboardOverview::load(&state.repos).await?))
}

/// GET /api/v1/dashboard/contacts
pub async fn contacts(State(state): State<Arc<AppState>>) -> ApiResult<Json<ContactFeed>> {
    let feed = match &state.live_contacts {
        Some(snapshot) => {
            let items = snapshot.rows().await;
            ContactFeed {
                count: items.len(),
                items,
                refreshed_at: snapshot.refreshed_at().await,
                refresh_count: snapshot.refresh_count(),
            }
        }
        None => {
            let items = state.repos.contacts.all().await?;
            ContactFeed {
                count: items.len(),
                items,
                refreshed_at: Utc::now(),
                refresh_count: 0,
            }
        }
    };
    Ok(Json(feed))
}
