//! Audience segments
//!
//! A segment is a conjunction of rules over record columns. Membership is
//! evaluated in memory against already-fetched rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use super::{require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::{compare_values, Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOp {
    Equals,
    NotEquals,
    /// Substring for text, membership for arrays
    Contains,
    GreaterThan,
    LessThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRule {
    pub field: String,
    pub op: RuleOp,
    pub value: Value,
}

impl SegmentRule {
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.get(&self.field).unwrap_or(&Value::Null);
        match self.op {
            RuleOp::Equals => equal(cell, &self.value),
            RuleOp::NotEquals => !equal(cell, &self.value),
            RuleOp::Contains => match (cell, &self.value) {
                (Value::String(text), Value::String(needle)) => {
                    text.to_lowercase().contains(&needle.to_lowercase())
                }
                (Value::Array(items), needle) => items.iter().any(|item| equal(item, needle)),
                _ => false,
            },
            RuleOp::GreaterThan => compare_values(cell, &self.value) == Some(Ordering::Greater),
            RuleOp::LessThan => compare_values(cell, &self.value) == Some(Ordering::Less),
        }
    }
}

fn equal(a: &Value, b: &Value) -> bool {
    a == b || compare_values(a, b) == Some(Ordering::Equal)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<SegmentRule>,
    pub created_at: DateTime<Utc>,
}

impl Segment {
    /// Every rule must match; a segment without rules contains everything.
    pub fn matches(&self, row: &Row) -> bool {
        self.rules.iter().all(|rule| rule.matches(row))
    }

    pub fn matches_record<T: Serialize>(&self, record: &T) -> bool {
        match serde_json::to_value(record) {
            Ok(Value::Object(row)) => self.matches(&row),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSegment {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<SegmentRule>,
}

impl Validate for NewSegment {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        for rule in &self.rules {
            require("rules.field", &rule.field)?;
        }
        Ok(())
    }
}

impl Record for Segment {
    const TABLE: Table = Table::Segments;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewSegment;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Segment {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(field: &str, op: RuleOp, value: Value) -> SegmentRule {
        SegmentRule {
            field: field.to_string(),
            op,
            value,
        }
    }

    fn lead() -> Row {
        json!({"email": "a@shop.io", "source": "Webinar", "score": 72, "tags": ["ecommerce", "vip"]})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_rule_ops() {
        let row = lead();
        assert!(rule("source", RuleOp::Equals, json!("Webinar")).matches(&row));
        assert!(rule("source", RuleOp::NotEquals, json!("ads")).matches(&row));
        assert!(rule("source", RuleOp::Contains, json!("web")).matches(&row));
        assert!(rule("tags", RuleOp::Contains, json!("vip")).matches(&row));
        assert!(rule("score", RuleOp::GreaterThan, json!(50)).matches(&row));
        assert!(rule("score", RuleOp::LessThan, json!("80")).matches(&row));
        assert!(!rule("score", RuleOp::GreaterThan, json!(90)).matches(&row));
        assert!(!rule("missing", RuleOp::Equals, json!("x")).matches(&row));
    }

    #[test]
    fn test_segment_is_conjunction() {
        let segment = Segment {
            id: Uuid::new_v4(),
            name: "Hot webinar leads".into(),
            description: None,
            rules: vec![
                rule("source", RuleOp::Equals, json!("Webinar")),
                rule("score", RuleOp::GreaterThan, json!(80)),
            ],
            created_at: Utc::now(),
        };
        assert!(!segment.matches(&lead()));

        let everyone = Segment { rules: vec![], ..segment };
        assert!(everyone.matches(&lead()));
    }
}
