//! Campaign Routes
//!
//! - GET /api/v1/campaigns/:id/metrics - Totals, rates, ROI and daily series
//! - GET /api/v1/analytics/campaigns - Totals across every campaign

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::{campaign_metrics, campaign_overview, CampaignMetrics, CampaignOverview};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::store::Query;

/// GET /api/v1/campaigns/:id/metrics
pub async fn metrics(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CampaignMetrics>> {
    let campaign = state.repos.campaigns.get(id).await?;
    let rows = state
        .repos
        .campaign_analytics
        .list(&Query::new().eq("campaign_id", id.to_string()))
        .await?;
    Ok(Json(campaign_metrics(&campaign, &rows)))
}

/// GET /api/v1/analytics/campaigns
pub async fn overview(State(state): State<Arc<AppState>>) -> ApiResult<Json<CampaignOverview>> {
    let (campaigns, rows) = tokio::try_join!(
        state.repos.campaigns.all(),
        state.repos.campaign_analytics.all()
    )?;
    Ok(Json(campaign_overview(&campaigns, &rows)))
}
