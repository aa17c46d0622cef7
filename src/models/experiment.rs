//! A/B experiments

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use super::{require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    #[default]
    Draft,
    Running,
    Paused,
    Completed,
}

impl ExperimentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperimentStatus::Draft => "draft",
            ExperimentStatus::Running => "running",
            ExperimentStatus::Paused => "paused",
            ExperimentStatus::Completed => "completed",
        }
    }

    /// Staying in the same status is always allowed (it is a no-op).
    pub fn can_transition_to(&self, target: ExperimentStatus) -> bool {
        use ExperimentStatus::*;
        *self == target
            || matches!(
                (*self, target),
                (Draft, Running)
                    | (Running, Paused)
                    | (Paused, Running)
                    | (Running, Completed)
                    | (Paused, Completed)
            )
    }

    /// The other side of the running/paused switch
    pub fn toggled(&self) -> Option<ExperimentStatus> {
        match self {
            ExperimentStatus::Running => Some(ExperimentStatus::Paused),
            ExperimentStatus::Paused => Some(ExperimentStatus::Running),
            _ => None,
        }
    }
}

impl std::str::FromStr for ExperimentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ExperimentStatus::Draft),
            "running" => Ok(ExperimentStatus::Running),
            "paused" => Ok(ExperimentStatus::Paused),
            "completed" => Ok(ExperimentStatus::Completed),
            other => Err(ValidationError::new(
                "status",
                format!("unknown experiment status '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(default)]
    pub visitors: u64,
    #[serde(default)]
    pub conversions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbExperiment {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub hypothesis: Option<String>,
    #[serde(default)]
    pub status: ExperimentStatus,
    #[serde(default)]
    pub variants: Vec<Variant>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAbExperiment {
    pub name: String,
    #[serde(default)]
    pub hypothesis: Option<String>,
    #[serde(default)]
    pub status: ExperimentStatus,
    pub variants: Vec<Variant>,
}

impl Validate for NewAbExperiment {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if self.variants.len() < 2 {
            return Err(ValidationError::new("variants", "at least two variants are required"));
        }

        let mut seen = HashSet::new();
        for variant in &self.variants {
            require("variants.name", &variant.name)?;
            if !seen.insert(variant.name.as_str()) {
                return Err(ValidationError::new(
                    "variants",
                    format!("duplicate variant '{}'", variant.name),
                ));
            }
            if variant.conversions > variant.visitors {
                return Err(ValidationError::new(
                    "variants",
                    format!("'{}' has more conversions than visitors", variant.name),
                ));
            }
        }
        Ok(())
    }
}

impl Record for AbExperiment {
    const TABLE: Table = Table::AbExperiments;
    type New = NewAbExperiment;
    const MANAGED_COLUMNS: &'static [&'static str] = &["status"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for AbExperiment {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.hypothesis.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExperimentStatus::*;

    #[test]
    fn test_transitions() {
        assert!(Draft.can_transition_to(Running));
        assert!(Running.can_transition_to(Paused));
        assert!(Paused.can_transition_to(Running));
        assert!(Paused.can_transition_to(Paused));
        assert!(Running.can_transition_to(Completed));

        assert!(!Completed.can_transition_to(Running));
        assert!(!Draft.can_transition_to(Paused));
        assert!(!Paused.can_transition_to(Draft));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(Running.toggled(), Some(Paused));
        assert_eq!(Paused.toggled(), Some(Running));
        assert_eq!(Draft.toggled(), None);
        assert_eq!(Completed.toggled(), None);
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("paused".parse::<ExperimentStatus>().unwrap(), Paused);
        assert!("archived".parse::<ExperimentStatus>().is_err());
    }

    #[test]
    fn test_duplicate_variants_rejected() {
        let experiment = NewAbExperiment {
            name: "Hero copy".to_string(),
            hypothesis: None,
            status: Draft,
            variants: vec![
                Variant { name: "A".into(), visitors: 0, conversions: 0 },
                Variant { name: "A".into(), visitors: 0, conversions: 0 },
            ],
        };
        assert_eq!(experiment.validate().unwrap_err().field, "variants");
    }
}
