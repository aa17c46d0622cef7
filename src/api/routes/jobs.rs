//! Job Routes
//!
//! - POST /api/v1/jobs/:id/apply - Apply to an open posting
//! - POST /api/v1/applications - Same rule, with the job id in the body
//! - GET /api/v1/jobs/:id/applications - Applications for a posting

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{ApplyRequest, ListResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::models::{ApplicationStatus, JobApplication, NewJobApplication};

/// POST /api/v1/jobs/:id/apply
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyRequest>,
) -> ApiResult<(StatusCode, Json<JobApplication>)> {
    let application = NewJobApplication {
        job_id: id,
        applicant_name: request.applicant_name,
        email: request.email,
        resume_url: request.resume_url,
        cover_letter: request.cover_letter,
        status: ApplicationStatus::Pending,
    };
    let created = state.repos.apply_to_job(&application).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/v1/applications
pub async fn create_application(
    State(state): State<Arc<AppState>>,
    Json(application): Json<NewJobApplication>,
) -> ApiResult<(StatusCode, Json<JobApplication>)> {
    let created = state.repos.apply_to_job(&application).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/v1/jobs/:id/applications
pub async fn applications(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListResponse<JobApplication>>> {
    Ok(Json(state.repos.applications_for(id).await?.into()))
}
