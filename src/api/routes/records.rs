//! Record Routes
//!
//! Generic CRUD endpoints, mounted once per table.
//!
//! - GET /api/v1/{resource} - List (search, status, limit, offset)
//! - POST /api/v1/{resource} - Create
//! - GET /api/v1/{resource}/:id - Get one row
//! - PATCH /api/v1/{resource}/:id - Merge a patch into a row
//! - DELETE /api/v1/{resource}/:id - Delete a row
//!
//! Records whose inserts carry business rules (applications, form
//! submissions, themes) mount their own create handler through
//! [`resource_with`]. Columns listed in `Record::MANAGED_COLUMNS` are only
//! changed by their dedicated endpoints and are refused here.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, MethodRouter},
    Json, Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{ListParams, ListResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::models::Record;
use crate::search::{filter_by_term, Searchable};
use crate::store::{Query as StoreQuery, Row};

/// Router with the five CRUD endpoints for `T` under `/{resource}`
pub fn resource<T>(resource: &str) -> Router<Arc<AppState>>
where
    T: Record + Searchable,
{
    resource_with::<T>(resource, post(create::<T>))
}

/// Like [`resource`], with `create` serving POST /{resource}
pub fn resource_with<T>(resource: &str, create: MethodRouter<Arc<AppState>>) -> Router<Arc<AppState>>
where
    T: Record + Searchable,
{
    Router::new()
        .route(&format!("/{}", resource), get(list::<T>).merge(create))
        .route(
            &format!("/{}/:id", resource),
            get(get_one::<T>).patch(update::<T>).delete(delete::<T>),
        )
}

/// GET /api/v1/{resource}
///
/// Newest first. The search term is applied after fetching, so paging is
/// applied after search when a term is given.
pub async fn list<T>(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<ListResponse<T>>>
where
    T: Record + Searchable,
{
    let mut query = StoreQuery::new().newest_first();

    if let Some(status) = params.status.as_deref() {
        let column = T::STATUS_COLUMN.ok_or_else(|| {
            ApiError::Validation(format!("{} cannot be filtered by status", T::TABLE))
        })?;
        query = query.eq(column, status);
    }

    let offset = params.offset.unwrap_or(0);
    let page_size = params.page_size();

    let items = match params.search_term() {
        None => {
            query = query.offset(offset).limit(page_size);
            state.repo::<T>().list(&query).await?
        }
        Some(term) => {
            let rows = state.repo::<T>().list(&query).await?;
            filter_by_term(rows, term)
                .into_iter()
                .skip(offset)
                .take(page_size)
                .collect()
        }
    };

    Ok(Json(items.into()))
}

/// POST /api/v1/{resource}
pub async fn create<T>(
    State(state): State<Arc<AppState>>,
    Json(new): Json<T::New>,
) -> ApiResult<(StatusCode, Json<T>)>
where
    T: Record + Searchable,
{
    let record = state.repo::<T>().create(&new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/v1/{resource}/:id
pub async fn get_one<T>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<T>>
where
    T: Record + Searchable,
{
    Ok(Json(state.repo::<T>().get(id).await?))
}

/// PATCH /api/v1/{resource}/:id
pub async fn update<T>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(patch): Json<Row>,
) -> ApiResult<Json<T>>
where
    T: Record + Searchable,
{
    if patch.is_empty() {
        return Err(ApiError::Validation("patch is empty".to_string()));
    }
    if let Some(column) = T::MANAGED_COLUMNS.iter().find(|c| patch.contains_key(**c)) {
        return Err(ApiError::Validation(format!(
            "{}.{} cannot be patched directly; use its dedicated endpoint",
            T::TABLE,
            column
        )));
    }
    Ok(Json(state.repo::<T>().update(id, patch).await?))
}

/// DELETE /api/v1/{resource}/:id
pub async fn delete<T>(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode>
where
    T: Record + Searchable,
{
    state.repo::<T>().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
