//! Job postings and applications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_email, require_http_url, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostingStatus {
    #[default]
    Draft,
    Open,
    Closed,
}

impl PostingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostingStatus::Draft => "draft",
            PostingStatus::Open => "open",
            PostingStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PostingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJobPosting {
    pub title: String,
    pub department: String,
    pub location: String,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: PostingStatus,
}

impl Validate for NewJobPosting {
    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("department", &self.department)?;
        require("location", &self.location)
    }
}

impl Record for JobPosting {
    const TABLE: Table = Table::JobPostings;
    type New = NewJobPosting;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for JobPosting {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.department.as_str(),
            self.location.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Interview,
    Rejected,
    Hired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_name: String,
    pub email: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJobApplication {
    pub job_id: Uuid,
    pub applicant_name: String,
    pub email: String,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub status: ApplicationStatus,
}

impl Validate for NewJobApplication {
    fn validate(&self) -> Result<(), ValidationError> {
        require("applicant_name", &self.applicant_name)?;
        require_email("email", &self.email)?;
        if let Some(url) = &self.resume_url {
            require_http_url("resume_url", url)?;
        }
        Ok(())
    }
}

impl Record for JobApplication {
    const TABLE: Table = Table::JobApplications;
    type New = NewJobApplication;
    const MANAGED_COLUMNS: &'static [&'static str] = &["job_id"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for JobApplication {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.applicant_name.as_str(), self.email.as_str()]
    }
}
