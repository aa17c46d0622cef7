use uuid::Uuid;

use super::{RepoError, RepoResult, Repositories};
use crate::models::{JobApplication, NewJobApplication, PostingStatus};
use crate::store::Query;

impl Repositories {
    /// Apply to a posting; only open postings accept applications
    pub async fn apply_to_job(&self, application: &NewJobApplication) -> RepoResult<JobApplication> {
        let job = self.jobs.get(application.job_id).await?;
        if job.status != PostingStatus::Open {
            return Err(RepoError::Conflict(format!(
                "job '{}' is {} and not accepting applications",
                job.title,
                job.status.as_str()
            )));
        }
        self.applications.create(application).await
    }

    pub async fn applications_for(&self, job_id: Uuid) -> RepoResult<Vec<JobApplication>> {
        let query = Query::new().eq("job_id", job_id.to_string()).newest_first();
        self.applications.list(&query).await
    }
}
