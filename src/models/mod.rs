//! Data Model
//!
//! Typed row shapes for every table the application touches. Each record has
//! a matching `New*` insert payload; payloads are validated before any write
//! reaches the backend.

pub mod campaign;
pub mod contact;
pub mod event;
pub mod experiment;
pub mod form;
pub mod job;
pub mod lead;
pub mod media;
pub mod segment;
pub mod theme;

pub use campaign::{Campaign, CampaignAnalytics, CampaignStatus, Channel, NewCampaign, NewCampaignAnalytics};
pub use contact::{ContactStatus, ContactSubmission, NewContactSubmission};
pub use event::{AnalyticsEvent, NewAnalyticsEvent};
pub use experiment::{AbExperiment, ExperimentStatus, NewAbExperiment, Variant};
pub use form::{FieldKind, Form, FormField, FormSubmission, NewForm, NewFormSubmission};
pub use job::{
    ApplicationStatus, EmploymentType, JobApplication, JobPosting, NewJobApplication,
    NewJobPosting, PostingStatus,
};
pub use lead::{Lead, LeadStatus, NewLead};
pub use media::{MediaFile, MediaKind, NewMediaFile};
pub use segment::{NewSegment, RuleOp, Segment, SegmentRule};
pub use theme::{NewTheme, Theme, MAX_BORDER_RADIUS};

use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

use crate::store::Table;

/// A persisted row with a known table
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table the record lives in
    const TABLE: Table;

    /// Column holding the lifecycle status, if the record has one
    const STATUS_COLUMN: Option<&'static str> = Some("status");

    /// Columns that only a dedicated operation may change, never a plain patch
    const MANAGED_COLUMNS: &'static [&'static str] = &[];

    /// Insert payload
    type New: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;

    fn id(&self) -> Uuid;
}

/// Input validation run before a write
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A rejected input field
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(())
}

pub(crate) fn require_email(field: &str, value: &str) -> Result<(), ValidationError> {
    require(field, value)?;
    if !is_valid_email(value) {
        return Err(ValidationError::new(field, "is not a valid email address"));
    }
    Ok(())
}

pub(crate) fn require_http_url(field: &str, value: &str) -> Result<(), ValidationError> {
    require(field, value)?;
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ValidationError::new(field, "must be an http(s) URL"));
    }
    Ok(())
}

pub fn is_valid_email(value: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(value.trim())
}

pub fn is_hex_color(value: &str) -> bool {
    static HEX: OnceLock<Regex> = OnceLock::new();
    HEX.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid color regex")
    })
    .is_match(value)
}
