//! Form Routes
//!
//! - POST /api/v1/forms/:id/submit - Public submission, checked against the form's fields
//! - POST /api/v1/form-submissions - Same check, with the form id in the body
//! - GET /api/v1/forms/:id/submissions - Submissions for a form
//! - GET /api/v1/forms/:id/submissions.csv - Same, as a CSV download
//! - GET /api/v1/analytics/forms - Submission counts per form

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::{form_stats, FormStats};
use crate::api::dto::{ListResponse, SubmitFormRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::models::{FormSubmission, NewFormSubmission};

/// Columns that precede the form's own fields in an export
const FIXED_COLUMNS: [&str; 3] = ["id", "created_at", "source"];

/// POST /api/v1/forms/:id/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubmitFormRequest>,
) -> ApiResult<(StatusCode, Json<FormSubmission>)> {
    let submission = state
        .repos
        .submit_form(id, request.data, request.source)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// POST /api/v1/form-submissions
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewFormSubmission>,
) -> ApiResult<(StatusCode, Json<FormSubmission>)> {
    let submission = state
        .repos
        .submit_form(new.form_id, new.data, new.source)
        .await?;
    Ok((StatusCode::CREATED, Json(submission)))
}

/// GET /api/v1/forms/:id/submissions
pub async fn submissions(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListResponse<FormSubmission>>> {
    Ok(Json(state.repos.submissions_for(id).await?.into()))
}

/// GET /api/v1/forms/:id/submissions.csv
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Response> {
    let form = state.repos.forms.get(id).await?;
    let rows = state.repos.submissions_for(id).await?;
    let body = submissions_csv(&rows)?;

    let filename = format!(
        "{}_submissions_{}.csv",
        slug(&form.name),
        Utc::now().format("%Y%m%d_%H%M%S")
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// GET /api/v1/analytics/forms
pub async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FormStats>>> {
    let (forms, submissions) =
        tokio::try_join!(state.repos.forms.all(), state.repos.form_submissions.all())?;
    Ok(Json(form_stats(&forms, &submissions)))
}

/// One row per submission; data columns are the union of keys across all rows.
pub fn submissions_csv(rows: &[FormSubmission]) -> ApiResult<String> {
    let fields: BTreeSet<&str> = rows
        .iter()
        .flat_map(|row| row.data.keys().map(String::as_str))
        .filter(|key| !FIXED_COLUMNS.contains(key))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(FIXED_COLUMNS.iter().copied().chain(fields.iter().copied()))
        .map_err(csv_error)?;

    for row in rows {
        let mut record = vec![
            row.id.to_string(),
            row.created_at.to_rfc3339(),
            row.source.clone().unwrap_or_default(),
        ];
        record.extend(fields.iter().map(|field| cell(row.data.get(*field))));
        writer.write_record(&record).map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ApiError::Internal(format!("CSV export failed: {}", e)))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| cell(Some(item)))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
    }
}

fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        "form".to_string()
    } else {
        slug.to_string()
    }
}

fn csv_error(err: csv::Error) -> ApiError {
    ApiError::Internal(format!("CSV export failed: {}", err))
}
