//! Segment Routes
//!
//! - GET /api/v1/segments/:id/members - Leads matching the segment rules
//! - GET /api/v1/analytics/segments?by=source - Leads grouped by a column
//! - GET /api/v1/analytics/segment-sizes - Member count per saved segment

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::{group_by_field, segment_sizes, GroupCount, SegmentSize};
use crate::api::dto::{GroupParams, ListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::models::Lead;

/// GET /api/v1/segments/:id/members
pub async fn members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListResponse<Lead>>> {
    Ok(Json(state.repos.segment_members(id).await?.into()))
}

/// GET /api/v1/analytics/segments
pub async fn group_leads(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GroupParams>,
) -> ApiResult<Json<Vec<GroupCount>>> {
    let field = params.by.trim();
    if field.is_empty() {
        return Err(ApiError::Validation("'by' must name a lead column".to_string()));
    }
    let leads = state.repos.leads.all().await?;
    Ok(Json(group_by_field(&leads, field)))
}

/// GET /api/v1/analytics/segment-sizes
pub async fn sizes(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SegmentSize>>> {
    let (segments, leads) = tokio::try_join!(state.repos.segments.all(), state.repos.leads.all())?;
    Ok(Json(segment_sizes(&segments, &leads)))
}
