//! Dashboards
//!
//! [`LiveSnapshot`] keeps an in-memory copy of one table and re-fetches it
//! in full whenever an insert into that table is announced on the hub.
//! There is no diffing and no ordering guarantee; a missed or lagged
//! notification also triggers a re-fetch.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;

use crate::models::{
    CampaignStatus, ContactStatus, ContactSubmission, ExperimentStatus, PostingStatus, Record,
};
use crate::repo::{RepoResult, Repositories, Repository};
use crate::store::Query;
use crate::websocket::{ConnectionHub, WsEvent};

struct SnapshotState<T> {
    rows: Vec<T>,
    refreshed_at: DateTime<Utc>,
}

/// Self-refreshing copy of a table, newest rows first
pub struct LiveSnapshot<T> {
    state: Arc<RwLock<SnapshotState<T>>>,
    refreshes: Arc<AtomicU64>,
    task: JoinHandle<()>,
}

impl<T: Record> LiveSnapshot<T> {
    /// Load the table and start listening for inserts
    pub async fn start(repo: Repository<T>, hub: &ConnectionHub) -> RepoResult<Self> {
        // Subscribe first so an insert racing the initial load is not lost
        let rx = hub.subscribe_broadcast();
        let rows = repo.all().await?;

        let state = Arc::new(RwLock::new(SnapshotState {
            rows,
            refreshed_at: Utc::now(),
        }));
        let refreshes = Arc::new(AtomicU64::new(0));

        let task = tokio::spawn(listen(
            repo,
            rx,
            Arc::clone(&state),
            Arc::clone(&refreshes),
        ));

        tracing::info!(table = %T::TABLE, "Live snapshot started");
        Ok(Self {
            state,
            refreshes,
            task,
        })
    }

    pub async fn rows(&self) -> Vec<T> {
        self.state.read().await.rows.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn refreshed_at(&self) -> DateTime<Utc> {
        self.state.read().await.refreshed_at
    }

    /// Re-fetches performed since start
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Relaxed)
    }
}

impl<T> Drop for LiveSnapshot<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn listen<T: Record>(
    repo: Repository<T>,
    mut rx: broadcast::Receiver<WsEvent>,
    state: Arc<RwLock<SnapshotState<T>>>,
    refreshes: Arc<AtomicU64>,
) {
    loop {
        match rx.recv().await {
            Ok(event) if event.is_insert_into(T::TABLE) => {}
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(table = %T::TABLE, skipped, "Snapshot lagged, re-fetching");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }

        match repo.all().await {
            Ok(rows) => {
                let mut guard = state.write().await;
                guard.rows = rows;
                guard.refreshed_at = Utc::now();
                refreshes.fetch_add(1, Ordering::Relaxed);
            }
            // Keep serving the previous rows; the next insert retries
            Err(e) => tracing::warn!(table = %T::TABLE, error = %e, "Snapshot re-fetch failed"),
        }
    }
}

/// Headline counts for the back-office landing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub new_contacts: usize,
    pub total_contacts: usize,
    pub leads: usize,
    pub open_jobs: usize,
    pub running_experiments: usize,
    pub active_campaigns: usize,
    pub generated_at: DateTime<Utc>,
}

impl DashboardOverview {
    pub async fn load(repos: &Repositories) -> RepoResult<Self> {
        let all = Query::new();
        let open = Query::new().eq("status", PostingStatus::Open.as_str());
        let running = Query::new().eq("status", ExperimentStatus::Running.as_str());
        let active = Query::new().eq("status", CampaignStatus::Active.as_str());

        let (contacts, leads, jobs, experiments, campaigns) = tokio::try_join!(
            repos.contacts.list(&all),
            repos.leads.list(&all),
            repos.jobs.list(&open),
            repos.experiments.list(&running),
            repos.campaigns.list(&active),
        )?;

        Ok(Self {
            new_contacts: count_new(&contacts),
            total_contacts: contacts.len(),
            leads: leads.len(),
            open_jobs: jobs.len(),
            running_experiments: experiments.len(),
            active_campaigns: campaigns.len(),
            generated_at: Utc::now(),
        })
    }
}

fn count_new(contacts: &[ContactSubmission]) -> usize {
    contacts
        .iter()
        .filter(|c| c.status == ContactStatus::New)
        .count()
}
