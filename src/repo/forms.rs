use uuid::Uuid;

use super::{RepoResult, Repositories};
use crate::models::{FormSubmission, NewFormSubmission};
use crate::store::{Query, Row};

impl Repositories {
    /// Accept a public submission for `form_id`.
    ///
    /// The values are checked against the form's field definitions; an
    /// inactive form rejects every submission.
    pub async fn submit_form(
        &self,
        form_id: Uuid,
        data: Row,
        source: Option<String>,
    ) -> RepoResult<FormSubmission> {
        let form = self.forms.get(form_id).await?;
        form.validate_submission(&data)?;

        let submission = NewFormSubmission {
            form_id,
            data,
            source,
        };
        self.form_submissions.create(&submission).await
    }

    /// Submissions for one form, newest first
    pub async fn submissions_for(&self, form_id: Uuid) -> RepoResult<Vec<FormSubmission>> {
        let query = Query::new()
            .eq("form_id", form_id.to_string())
            .newest_first();
        self.form_submissions.list(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldKind, FormField, NewForm};
    use crate::repo::tests::repos;
    use crate::repo::RepoError;
    use serde_json::json;

    fn newsletter() -> NewForm {
        NewForm {
            name: "Newsletter".to_string(),
            description: None,
            fields: vec![FormField {
                name: "email".to_string(),
                label: "Email".to_string(),
                kind: FieldKind::Email,
                required: true,
                options: vec![],
            }],
            is_active: true,
        }
    }

    fn row(value: serde_json::Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_submit_and_list() {
        let repos = repos();
        let form = repos.forms.create(&newsletter()).await.unwrap();

        repos
            .submit_form(form.id, row(json!({"email": "a@b.io"})), Some("footer".into()))
            .await
            .unwrap();

        let submissions = repos.submissions_for(form.id).await.unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].source.as_deref(), Some("footer"));
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_values() {
        let repos = repos();
        let form = repos.forms.create(&newsletter()).await.unwrap();

        let err = repos
            .submit_form(form.id, row(json!({"email": "nope"})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        assert!(repos.submissions_for(form.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_to_inactive_form() {
        let repos = repos();
        let mut new = newsletter();
        new.is_active = false;
        let form = repos.forms.create(&new).await.unwrap();

        let err = repos
            .submit_form(form.id, row(json!({"email": "a@b.io"})), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
