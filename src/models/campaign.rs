//! Marketing campaigns and their daily delivery analytics

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Social,
    Search,
    Display,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub name: String,
    pub channel: Channel,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub channel: Channel,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub budget: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Validate for NewCampaign {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if !self.budget.is_finite() || self.budget < 0.0 {
            return Err(ValidationError::new("budget", "must be zero or positive"));
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::new("end_date", "must not be before start_date"));
            }
        }
        Ok(())
    }
}

impl Record for Campaign {
    const TABLE: Table = Table::Campaigns;
    type New = NewCampaign;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Campaign {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

/// One day of delivery counters for a campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignAnalytics {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub unsubscribed: u64,
    #[serde(default)]
    pub revenue: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCampaignAnalytics {
    pub campaign_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub sent: u64,
    #[serde(default)]
    pub opened: u64,
    #[serde(default)]
    pub clicked: u64,
    #[serde(default)]
    pub conversions: u64,
    #[serde(default)]
    pub bounced: u64,
    #[serde(default)]
    pub unsubscribed: u64,
    #[serde(default)]
    pub revenue: f64,
}

impl Validate for NewCampaignAnalytics {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("opened", self.opened),
            ("clicked", self.clicked),
            ("bounced", self.bounced),
        ] {
            if value > self.sent {
                return Err(ValidationError::new(field, "cannot exceed sent"));
            }
        }
        if !self.revenue.is_finite() || self.revenue < 0.0 {
            return Err(ValidationError::new("revenue", "must be zero or positive"));
        }
        Ok(())
    }
}

impl Record for CampaignAnalytics {
    const TABLE: Table = Table::CampaignAnalytics;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewCampaignAnalytics;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for CampaignAnalytics {
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }
}
