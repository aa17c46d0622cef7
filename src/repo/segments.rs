use uuid::Uuid;

use super::{RepoResult, Repositories};
use crate::models::Lead;

impl Repositories {
    /// Leads matching every rule of the segment
    pub async fn segment_members(&self, segment_id: Uuid) -> RepoResult<Vec<Lead>> {
        let segment = self.segments.get(segment_id).await?;
        let leads = self.leads.all().await?;
        Ok(leads
            .into_iter()
            .filter(|lead| segment.matches_record(lead))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{LeadStatus, NewLead, NewSegment, RuleOp, SegmentRule};
    use crate::repo::tests::repos;
    use serde_json::json;

    fn lead(email: &str, score: i32, tags: &[&str]) -> NewLead {
        NewLead {
            email: email.to_string(),
            name: None,
            source: "webinar".to_string(),
            score,
            status: LeadStatus::New,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_segment_members() {
        let repos = repos();
        repos.leads.create(&lead("hot@a.io", 80, &["saas"])).await.unwrap();
        repos.leads.create(&lead("cold@a.io", 10, &["saas"])).await.unwrap();
        repos.leads.create(&lead("other@a.io", 90, &["retail"])).await.unwrap();

        let segment = repos
            .segments
            .create(&NewSegment {
                name: "Hot SaaS".to_string(),
                description: None,
                rules: vec![
                    SegmentRule { field: "score".into(), op: RuleOp::GreaterThan, value: json!(50) },
                    SegmentRule { field: "tags".into(), op: RuleOp::Contains, value: json!("saas") },
                ],
            })
            .await
            .unwrap();

        let members = repos.segment_members(segment.id).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].email, "hot@a.io");
    }
}
