//! Captured leads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_email, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Nurturing,
    Qualified,
    Converted,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub source: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLead {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub source: String,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Validate for NewLead {
    fn validate(&self) -> Result<(), ValidationError> {
        require_email("email", &self.email)?;
        require("source", &self.source)?;
        if !(0..=100).contains(&self.score) {
            return Err(ValidationError::new("score", "must be between 0 and 100"));
        }
        Ok(())
    }
}

impl Record for Lead {
    const TABLE: Table = Table::Leads;
    type New = NewLead;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Lead {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.email.as_str(), self.source.as_str()];
        fields.extend(self.name.as_deref());
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        let lead = NewLead {
            email: "lead@shop.io".into(),
            name: None,
            source: "landing_page".into(),
            score: 101,
            status: LeadStatus::New,
            tags: vec![],
        };
        assert_eq!(lead.validate().unwrap_err().field, "score");
    }
}
