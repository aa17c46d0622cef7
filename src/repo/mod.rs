//! Repository layer
//!
//! Typed access to the backend. Dashboards and API handlers never build raw
//! rows themselves; they go through a [`Repository`] which validates inserts,
//! decodes rows into records, and announces every mutation on the
//! WebSocket hub so live dashboards re-query.

mod contacts;
mod experiments;
mod forms;
mod jobs;
mod media;
mod segments;
mod themes;

pub use experiments::StatusChange;
pub use media::FolderSummary;

use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    AbExperiment, AnalyticsEvent, Campaign, CampaignAnalytics, ContactSubmission, Form,
    FormSubmission, JobApplication, JobPosting, Lead, MediaFile, Record, Segment, Theme,
    Validate, ValidationError,
};
use crate::store::{check_patch, Query, Row, Store, StoreError};
use crate::websocket::{ChangeKind, ConnectionHub, WsEvent};

/// Errors surfaced by repository operations
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The row exists but is not in a state that allows the operation
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl RepoError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepoError::Store(StoreError::NotFound { .. }))
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Typed CRUD over one table
pub struct Repository<T> {
    store: Arc<dyn Store>,
    hub: Option<Arc<ConnectionHub>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            hub: self.hub.clone(),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn Store>, hub: Option<Arc<ConnectionHub>>) -> Self {
        Self {
            store,
            hub,
            _record: PhantomData,
        }
    }

    pub async fn list(&self, query: &Query) -> RepoResult<Vec<T>> {
        let rows = self.store.select(T::TABLE, query).await?;
        rows.into_iter().map(decode::<T>).collect()
    }

    pub async fn all(&self) -> RepoResult<Vec<T>> {
        self.list(&Query::new().newest_first()).await
    }

    pub async fn get(&self, id: Uuid) -> RepoResult<T> {
        let query = Query::new().eq("id", id.to_string()).limit(1);
        let row = self
            .store
            .select(T::TABLE, &query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::not_found(T::TABLE.as_str(), id.to_string()))?;
        decode(row)
    }

    /// Validate and insert a new row
    pub async fn create(&self, new: &T::New) -> RepoResult<T> {
        new.validate()?;

        let stored = self.store.insert(T::TABLE, encode(new)?).await?;
        let record: T = decode(stored)?;

        tracing::info!(table = %T::TABLE, id = %record.id(), "Created row");
        self.announce(record.id(), ChangeKind::Insert);
        Ok(record)
    }

    /// Merge `patch` into the row; the result must still decode as `T` and
    /// pass the same checks as an insert.
    ///
    /// The merge is checked locally first so a patch that breaks the row
    /// never reaches the backend.
    pub async fn update(&self, id: Uuid, patch: Row) -> RepoResult<T> {
        check_patch(&patch)?;
        let mut merged = encode(&self.get(id).await?)?;
        merged.extend(patch.clone());
        if let Err(e) = decode::<T>(merged.clone()) {
            return Err(ValidationError::new("patch", e.to_string()).into());
        }
        merged.remove("id");
        merged.remove("created_at");
        let payload: T::New = serde_json::from_value(Value::Object(merged))
            .map_err(|e| ValidationError::new("patch", e.to_string()))?;
        payload.validate()?;

        let stored = self.store.update(T::TABLE, &id.to_string(), patch).await?;
        let record: T = decode(stored)?;

        tracing::info!(table = %T::TABLE, id = %id, "Updated row");
        self.announce(id, ChangeKind::Update);
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> RepoResult<()> {
        self.store.delete(T::TABLE, &id.to_string()).await?;

        tracing::info!(table = %T::TABLE, id = %id, "Deleted row");
        self.announce(id, ChangeKind::Delete);
        Ok(())
    }

    fn announce(&self, id: Uuid, change: ChangeKind) {
        if let Some(hub) = &self.hub {
            hub.publish(WsEvent::row_changed(T::TABLE, id.to_string(), change));
        }
    }
}

fn decode<T: Record>(row: Row) -> RepoResult<T> {
    serde_json::from_value(Value::Object(row)).map_err(|e| {
        RepoError::Store(StoreError::Serialization(format!(
            "{} row does not match its schema: {}",
            T::TABLE,
            e
        )))
    })
}

pub(crate) fn encode<S: Serialize>(value: &S) -> RepoResult<Row> {
    match serde_json::to_value(value).map_err(StoreError::from)? {
        Value::Object(row) => Ok(row),
        _ => Err(StoreError::Serialization("record is not a JSON object".to_string()).into()),
    }
}

/// Single-column patch
pub(crate) fn patch_of(column: &str, value: impl Serialize) -> RepoResult<Row> {
    let mut row = Row::new();
    row.insert(
        column.to_string(),
        serde_json::to_value(value).map_err(StoreError::from)?,
    );
    Ok(row)
}

/// One repository per table, sharing a store and a change feed
#[derive(Clone)]
pub struct Repositories {
    pub contacts: Repository<ContactSubmission>,
    pub campaigns: Repository<Campaign>,
    pub campaign_analytics: Repository<CampaignAnalytics>,
    pub experiments: Repository<AbExperiment>,
    pub forms: Repository<Form>,
    pub form_submissions: Repository<FormSubmission>,
    pub jobs: Repository<JobPosting>,
    pub applications: Repository<JobApplication>,
    pub segments: Repository<Segment>,
    pub themes: Repository<Theme>,
    pub events: Repository<AnalyticsEvent>,
    pub leads: Repository<Lead>,
    pub media: Repository<MediaFile>,
}

impl Repositories {
    pub fn new(store: Arc<dyn Store>, hub: Option<Arc<ConnectionHub>>) -> Self {
        Self {
            contacts: Repository::new(Arc::clone(&store), hub.clone()),
            campaigns: Repository::new(Arc::clone(&store), hub.clone()),
            campaign_analytics: Repository::new(Arc::clone(&store), hub.clone()),
            experiments: Repository::new(Arc::clone(&store), hub.clone()),
            forms: Repository::new(Arc::clone(&store), hub.clone()),
            form_submissions: Repository::new(Arc::clone(&store), hub.clone()),
            jobs: Repository::new(Arc::clone(&store), hub.clone()),
            applications: Repository::new(Arc::clone(&store), hub.clone()),
            segments: Repository::new(Arc::clone(&store), hub.clone()),
            themes: Repository::new(Arc::clone(&store), hub.clone()),
            events: Repository::new(Arc::clone(&store), hub.clone()),
            leads: Repository::new(Arc::clone(&store), hub.clone()),
            media: Repository::new(store, hub),
        }
    }
}
