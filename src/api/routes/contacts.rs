//! Contact Routes
//!
//! - POST /api/v1/contacts/wizard - Submit the multi-step contact wizard
//! - POST /api/v1/contacts/:id/status - Move a submission through the inbox

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::StatusRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::models::{ContactStatus, ContactSubmission, NewContactSubmission};
use crate::wizard::{ContactSummary, ContactWizard, WizardSubmission};

#[derive(Debug, Serialize)]
pub struct WizardResponse {
    pub submission: ContactSubmission,
    pub summary: ContactSummary,
}

/// POST /api/v1/contacts/wizard
///
/// Every step is validated in order; the first failing step is reported.
pub async fn submit_wizard(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<WizardSubmission>,
) -> ApiResult<(StatusCode, Json<WizardResponse>)> {
    let summary = ContactWizard::complete(submission)?;
    let new: NewContactSubmission = summary.clone().into();
    let submission = state.repos.contacts.create(&new).await?;

    tracing::info!(id = %submission.id, services = summary.services.len(), "Contact wizard submitted");
    Ok((StatusCode::CREATED, Json(WizardResponse { submission, summary })))
}

/// POST /api/v1/contacts/:id/status
pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<ContactSubmission>> {
    let status: ContactStatus = serde_json::from_value(Value::String(request.status.clone()))
        .map_err(|_| {
            ApiError::Validation(format!("unknown contact status '{}'", request.status))
        })?;
    Ok(Json(state.repos.contacts.update_status(id, status).await?))
}
