//! Audience grouping and segment sizing

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use super::pct;
use crate::models::{Lead, Segment};

/// Label used for rows where the field is missing or null
pub const NO_VALUE: &str = "(none)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
    /// Percentage of all records
    pub share: f64,
}

/// Count records by the value of `field`.
///
/// Array values (e.g. tags) count once per element, so shares can add up
/// to more than 100. Sorted by count descending, then key.
pub fn group_by_field<T: Serialize>(records: &[T], field: &str) -> Vec<GroupCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for record in records {
        let value = match serde_json::to_value(record) {
            Ok(Value::Object(mut row)) => row.remove(field).unwrap_or(Value::Null),
            _ => Value::Null,
        };
        match value {
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    *counts.entry(group_key(&item)).or_default() += 1;
                }
            }
            other => *counts.entry(group_key(&other)).or_default() += 1,
        }
    }

    let total = records.len() as u64;
    let mut groups: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount {
            key,
            count,
            share: pct(count, total),
        })
        .collect();
    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    groups
}

fn group_key(value: &Value) -> String {
    match value {
        Value::Null | Value::Array(_) => NO_VALUE.to_string(),
        Value::String(s) if s.trim().is_empty() => NO_VALUE.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSize {
    pub segment_id: Uuid,
    pub name: String,
    pub members: u64,
    /// Percentage of all leads
    pub share: f64,
}

/// Evaluate every segment against the lead list, largest first
pub fn segment_sizes(segments: &[Segment], leads: &[Lead]) -> Vec<SegmentSize> {
    let total = leads.len() as u64;
    let mut sizes: Vec<SegmentSize> = segments
        .iter()
        .map(|segment| {
            let members = leads.iter().filter(|l| segment.matches_record(*l)).count() as u64;
            SegmentSize {
                segment_id: segment.id,
                name: segment.name.clone(),
                members,
                share: pct(members, total),
            }
        })
        .collect();
    sizes.sort_by(|a, b| b.members.cmp(&a.members).then_with(|| a.name.cmp(&b.name)));
    sizes
}
