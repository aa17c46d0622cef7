use uuid::Uuid;

use super::{patch_of, RepoResult, Repository};
use crate::models::{ContactStatus, ContactSubmission};
use crate::store::Query;

impl Repository<ContactSubmission> {
    pub async fn update_status(&self, id: Uuid, status: ContactStatus) -> RepoResult<ContactSubmission> {
        let current = self.get(id).await?;
        if current.status == status {
            return Ok(current);
        }
        self.update(id, patch_of("status", status)?).await
    }

    /// Inbox view: unanswered submissions, newest first
    pub async fn inbox(&self) -> RepoResult<Vec<ContactSubmission>> {
        let query = Query::new()
            .eq("status", ContactStatus::New.as_str())
            .newest_first();
        self.list(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewContactSubmission;
    use crate::repo::tests::repos;

    fn contact(name: &str) -> NewContactSubmission {
        NewContactSubmission {
            name: name.to_string(),
            email: "hello@client.io".to_string(),
            phone: None,
            company: None,
            website: None,
            budget: None,
            services: vec!["seo".to_string()],
            message: "Let's talk".to_string(),
            timeline: None,
            status: ContactStatus::New,
        }
    }

    #[tokio::test]
    async fn test_inbox_excludes_handled_contacts() {
        let repos = repos();
        let first = repos.contacts.create(&contact("First")).await.unwrap();
        repos.contacts.create(&contact("Second")).await.unwrap();

        repos
            .contacts
            .update_status(first.id, ContactStatus::Contacted)
            .await
            .unwrap();

        let inbox = repos.contacts.inbox().await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].name, "Second");
    }
}
