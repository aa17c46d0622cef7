use serde::Serialize;
use uuid::Uuid;

use super::{patch_of, RepoError, RepoResult, Repository};
use crate::models::{AbExperiment, ExperimentStatus};

/// Result of a status mutation; `changed` is false when nothing was written
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange<T> {
    pub record: T,
    pub changed: bool,
}

impl Repository<AbExperiment> {
    /// Move an experiment to `target`.
    ///
    /// Applying the status the experiment already has is a no-op and does
    /// not touch the backend, so repeated identical clicks are harmless.
    pub async fn set_status(
        &self,
        id: Uuid,
        target: ExperimentStatus,
    ) -> RepoResult<StatusChange<AbExperiment>> {
        let current = self.get(id).await?;

        if current.status == target {
            tracing::debug!(id = %id, status = target.as_str(), "Experiment already in status");
            return Ok(StatusChange {
                record: current,
                changed: false,
            });
        }

        if !current.status.can_transition_to(target) {
            return Err(RepoError::Conflict(format!(
                "experiment cannot move from {} to {}",
                current.status.as_str(),
                target.as_str()
            )));
        }

        let record = self.update(id, patch_of("status", target)?).await?;
        Ok(StatusChange {
            record,
            changed: true,
        })
    }

    /// Flip between running and paused
    pub async fn toggle(&self, id: Uuid) -> RepoResult<StatusChange<AbExperiment>> {
        let current = self.get(id).await?;
        let target = current.status.toggled().ok_or_else(|| {
            RepoError::Conflict(format!(
                "only running or paused experiments can be toggled (status is {})",
                current.status.as_str()
            ))
        })?;
        self.set_status(id, target).await
    }
}
