//! Media Routes
//!
//! - GET /api/v1/media/folders - File count and size per folder

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::repo::FolderSummary;

/// GET /api/v1/media/folders
pub async fn folders(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FolderSummary>>> {
    Ok(Json(state.repos.media.folders().await?))
}
