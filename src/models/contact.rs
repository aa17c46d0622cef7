//! Contact form submissions from the public site

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_email, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "new",
            ContactStatus::Contacted => "contacted",
            ContactStatus::Qualified => "qualified",
            ContactStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub status: ContactStatus,
}

impl Validate for NewContactSubmission {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require_email("email", &self.email)?;
        if self.services.is_empty() {
            return Err(ValidationError::new("services", "select at least one service"));
        }
        require("message", &self.message)
    }
}

impl Record for ContactSubmission {
    const TABLE: Table = Table::ContactSubmissions;
    type New = NewContactSubmission;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for ContactSubmission {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str()];
        fields.extend(self.company.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_contact() -> NewContactSubmission {
        NewContactSubmission {
            name: "Ada Lovelace".to_string(),
            email: "ada@engines.io".to_string(),
            phone: None,
            company: Some("Analytical Engines".to_string()),
            website: None,
            budget: None,
            services: vec!["branding".to_string()],
            message: "We need a rebrand".to_string(),
            timeline: None,
            status: ContactStatus::New,
        }
    }

    #[test]
    fn test_valid_contact() {
        assert!(new_contact().validate().is_ok());
    }

    #[test]
    fn test_contact_requires_service() {
        let mut contact = new_contact();
        contact.services.clear();
        assert_eq!(contact.validate().unwrap_err().field, "services");
    }

    #[test]
    fn test_status_deserializes_snake_case() {
        let status: ContactStatus = serde_json::from_str("\"qualified\"").unwrap();
        assert_eq!(status, ContactStatus::Qualified);
        assert_eq!(status.as_str(), "qualified");
    }
}
