//! Form submission volume

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::pct;
use crate::models::{Form, FormSubmission};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormStats {
    pub form_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub submissions: u64,
    /// Percentage of all submissions
    pub share: f64,
    pub last_submission_at: Option<DateTime<Utc>>,
}

/// Submissions per form, busiest first
pub fn form_stats(forms: &[Form], submissions: &[FormSubmission]) -> Vec<FormStats> {
    let mut per_form: HashMap<Uuid, (u64, Option<DateTime<Utc>>)> = HashMap::new();
    for submission in submissions {
        let entry = per_form.entry(submission.form_id).or_default();
        entry.0 += 1;
        entry.1 = entry.1.max(Some(submission.created_at));
    }

    let total = submissions.len() as u64;
    let mut stats: Vec<FormStats> = forms
        .iter()
        .map(|form| {
            let (count, last) = per_form.get(&form.id).copied().unwrap_or_default();
            FormStats {
                form_id: form.id,
                name: form.name.clone(),
                is_active: form.is_active,
                submissions: count,
                share: pct(count, total),
                last_submission_at: last,
            }
        })
        .collect();
    stats.sort_by(|a, b| b.submissions.cmp(&a.submissions).then_with(|| a.name.cmp(&b.name)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Row;
    use chrono::Duration;

    fn form(name: &str) -> Form {
        Form {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            fields: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn submission(form_id: Uuid, at: DateTime<Utc>) -> FormSubmission {
        FormSubmission {
            id: Uuid::new_v4(),
            form_id,
            data: Row::new(),
            source: None,
            created_at: at,
        }
    }

    #[test]
    fn test_form_stats() {
        let contact = form("Contact");
        let quote = form("Quote");
        let now = Utc::now();
        let submissions = vec![
            submission(quote.id, now - Duration::days(2)),
            submission(quote.id, now),
            submission(contact.id, now - Duration::days(1)),
            // orphaned rows still count toward the total
            submission(Uuid::new_v4(), now),
        ];

        let stats = form_stats(&[contact.clone(), quote.clone()], &submissions);
        assert_eq!(stats[0].name, "Quote");
        assert_eq!(stats[0].submissions, 2);
        assert_eq!(stats[0].share, 50.0);
        assert_eq!(stats[0].last_submission_at, Some(now));
        assert_eq!(stats[1].submissions, 1);
    }

    #[test]
    fn test_form_without_submissions() {
        let stats = form_stats(&[form("Empty")], &[]);
        assert_eq!(stats[0].submissions, 0);
        assert_eq!(stats[0].share, 0.0);
        assert_eq!(stats[0].last_submission_at, None);
    }
}
