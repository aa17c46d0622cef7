//! Table catalogue
//!
//! The hosted backend owns the schema; this is the set of tables the
//! application reads and writes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    ContactSubmissions,
    Campaigns,
    CampaignAnalytics,
    AbExperiments,
    Forms,
    FormSubmissions,
    JobPostings,
    JobApplications,
    Segments,
    Themes,
    AnalyticsEvents,
    Leads,
    MediaFiles,
}

impl Table {
    pub const ALL: [Table; 13] = [
        Table::ContactSubmissions,
        Table::Campaigns,
        Table::CampaignAnalytics,
        Table::AbExperiments,
        Table::Forms,
        Table::FormSubmissions,
        Table::JobPostings,
        Table::JobApplications,
        Table::Segments,
        Table::Themes,
        Table::AnalyticsEvents,
        Table::Leads,
        Table::MediaFiles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::ContactSubmissions => "contact_submissions",
            Table::Campaigns => "campaigns",
            Table::CampaignAnalytics => "campaign_analytics",
            Table::AbExperiments => "ab_experiments",
            Table::Forms => "forms",
            Table::FormSubmissions => "form_submissions",
            Table::JobPostings => "job_postings",
            Table::JobApplications => "job_applications",
            Table::Segments => "segments",
            Table::Themes => "themes",
            Table::AnalyticsEvents => "analytics_events",
            Table::Leads => "leads",
            Table::MediaFiles => "media_files",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| StoreError::UnknownTable(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tables() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
    }

    #[test]
    fn test_parse_unknown_table() {
        let err = "users".parse::<Table>().unwrap_err();
        assert!(matches!(err, StoreError::UnknownTable(name) if name == "users"));
    }
}
