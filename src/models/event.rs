//! Raw analytics events (page views, clicks, form starts, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::{Row, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: Uuid,
    pub session_id: String,
    pub event_name: String,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub properties: Row,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnalyticsEvent {
    pub session_id: String,
    pub event_name: String,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub properties: Row,
}

impl Validate for NewAnalyticsEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        require("session_id", &self.session_id)?;
        require("event_name", &self.event_name)
    }
}

impl Record for AnalyticsEvent {
    const TABLE: Table = Table::AnalyticsEvents;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewAnalyticsEvent;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for AnalyticsEvent {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.event_name.as_str()];
        fields.extend(self.page.as_deref());
        fields
    }
}
