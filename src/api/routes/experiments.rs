//! Experiment Routes
//!
//! - POST /api/v1/experiments/:id/status - Move to a status (no-op if already there)
//! - POST /api/v1/experiments/:id/toggle - Switch between running and paused
//! - GET /api/v1/experiments/:id/results - Per-variant conversion and lift

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::{experiment_results, ExperimentResults};
use crate::api::dto::StatusRequest;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::models::{AbExperiment, ExperimentStatus};
use crate::repo::StatusChange;

/// POST /api/v1/experiments/:id/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<StatusChange<AbExperiment>>> {
    let target: ExperimentStatus = request.status.parse()?;
    Ok(Json(state.repos.experiments.set_status(id, target).await?))
}

/// POST /api/v1/experiments/:id/toggle
pub async fn toggle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<StatusChange<AbExperiment>>> {
    Ok(Json(state.repos.experiments.toggle(id).await?))
}

/// GET /api/v1/experiments/:id/results
pub async fn results(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ExperimentResults>> {
    let experiment = state.repos.experiments.get(id).await?;
    Ok(Json(experiment_results(&experiment)))
}
