//! Theme and Preference Routes
//!
//! - POST /api/v1/themes - Create a theme; an active one replaces the current
//! - POST /api/v1/themes/:id/activate - Make a theme the only active one
//! - GET /api/v1/theme.css - CSS variables for the public site
//! - GET /api/v1/preferences - All stored preferences
//! - GET /api/v1/preferences/:key - One preference
//! - PUT /api/v1/preferences/:key - Set a preference
//! - DELETE /api/v1/preferences/:key - Remove a preference

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{PreferenceRequest, PreferenceResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::models::{NewTheme, Theme};
use crate::theme::render_css;

/// POST /api/v1/themes
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewTheme>,
) -> ApiResult<(StatusCode, Json<Theme>)> {
    let theme = state.repos.themes.add(&new).await?;
    Ok((StatusCode::CREATED, Json(theme)))
}

/// POST /api/v1/themes/:id/activate
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Theme>> {
    Ok(Json(state.repos.themes.activate(id).await?))
}

/// GET /api/v1/theme.css
///
/// Falls back to the default palette when no theme is active.
pub async fn stylesheet(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    let active = state.repos.themes.active().await?;
    let css = {
        let preferences = state.preferences.read().await;
        render_css(active.as_ref(), &preferences)
    };

    Ok((
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        css,
    ))
}

/// GET /api/v1/preferences
pub async fn list_preferences(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, Value>> {
    Json(state.preferences.read().await.entries().clone())
}

/// GET /api/v1/preferences/:key
pub async fn get_preference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<PreferenceResponse>> {
    let preferences = state.preferences.read().await;
    let value = preferences
        .get(&key)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("preference '{}'", key)))?;
    Ok(Json(PreferenceResponse { key, value }))
}

/// PUT /api/v1/preferences/:key
pub async fn set_preference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<PreferenceRequest>,
) -> ApiResult<Json<PreferenceResponse>> {
    state
        .preferences
        .write()
        .await
        .set(&key, request.value.clone())?;

    tracing::info!(key = %key, "Preference updated");
    Ok(Json(PreferenceResponse {
        key,
        value: request.value,
    }))
}

/// DELETE /api/v1/preferences/:key
pub async fn delete_preference(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    match state.preferences.write().await.remove(&key)? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(ApiError::NotFound(format!("preference '{}'", key))),
    }
}
