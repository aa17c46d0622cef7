//! Event Routes
//!
//! Events themselves are created through the generic `/events` resource.
//!
//! - GET /api/v1/analytics/funnel?steps=page_view,form_start,form_submit

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use std::sync::Arc;

use crate::analytics::{FunnelBuilder, FunnelReport};
use crate::api::dto::FunnelParams;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::Query as StoreQuery;

/// GET /api/v1/analytics/funnel
pub async fn funnel(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FunnelParams>,
) -> ApiResult<Json<FunnelReport>> {
    let builder = FunnelBuilder::from_steps(
        params
            .steps
            .split(',')
            .map(str::trim)
            .filter(|step| !step.is_empty()),
    )?;
    if builder.is_empty() {
        return Err(ApiError::Validation("a funnel needs at least one step".to_string()));
    }

    let names = builder.steps().iter().map(|s| Value::from(s.as_str())).collect();
    let query = StoreQuery::new().in_list("event_name", names);
    let events = state.repos.events.list(&query).await?;
    Ok(Json(builder.evaluate(&events)))
}
