//! Event funnels
//!
//! A funnel is an ordered list of event names. A session reaches step `n`
//! once it has fired steps `0..=n` in that order (other events in between
//! are ignored).

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use super::pct;
use crate::models::AnalyticsEvent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelStep {
    pub name: String,
    /// Sessions that reached this step
    pub sessions: u64,
    /// Share of the previous step's sessions; the first step is 100 when entered
    pub step_conversion: f64,
    /// Share of the first step's sessions
    pub overall_conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunnelReport {
    pub steps: Vec<FunnelStep>,
    /// Last step over first step
    pub overall_conversion: f64,
}

pub fn compute_funnel(steps: &[String], events: &[AnalyticsEvent]) -> FunnelReport {
    let mut sessions: HashMap<&str, Vec<&AnalyticsEvent>> = HashMap::new();
    for event in events {
        sessions.entry(event.session_id.as_str()).or_default().push(event);
    }

    let mut reached = vec![0u64; steps.len()];
    for mut session_events in sessions.into_values() {
        session_events.sort_by_key(|e| e.created_at);

        let mut depth = 0;
        for event in session_events {
            if depth < steps.len() && event.event_name == steps[depth] {
                depth += 1;
            }
        }
        for count in reached.iter_mut().take(depth) {
            *count += 1;
        }
    }

    let first = reached.first().copied().unwrap_or(0);
    let last = reached.last().copied().unwrap_or(0);

    let steps = steps
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let previous = if i == 0 { reached[0] } else { reached[i - 1] };
            FunnelStep {
                name: name.clone(),
                sessions: reached[i],
                step_conversion: pct(reached[i], previous),
                overall_conversion: pct(reached[i], first),
            }
        })
        .collect();

    FunnelReport {
        steps,
        overall_conversion: pct(last, first),
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FunnelError {
    #[error("Step name cannot be empty")]
    EmptyStep,

    #[error("Step '{0}' is already in the funnel")]
    DuplicateStep(String),

    #[error("Step index {index} out of range (funnel has {len} steps)")]
    OutOfRange { index: usize, len: usize },
}

/// Editable step list behind the funnel builder screen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FunnelBuilder {
    steps: Vec<String>,
}

impl FunnelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting blanks and duplicates
    pub fn from_steps<I, S>(steps: I) -> Result<Self, FunnelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = Self::new();
        for step in steps {
            builder.add(step)?;
        }
        Ok(builder)
    }

    /// Append a step at the end
    pub fn add(&mut self, step: impl Into<String>) -> Result<(), FunnelError> {
        let step = step.into().trim().to_string();
        if step.is_empty() {
            return Err(FunnelError::EmptyStep);
        }
        if self.steps.contains(&step) {
            return Err(FunnelError::DuplicateStep(step));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Returns false when the step was not in the funnel
    pub fn remove(&mut self, step: &str) -> bool {
        let before = self.steps.len();
        self.steps.retain(|s| s != step);
        self.steps.len() != before
    }

    /// Move the step at `from` so it ends up at index `to`
    pub fn move_step(&mut self, from: usize, to: usize) -> Result<(), FunnelError> {
        let len = self.steps.len();
        for index in [from, to] {
            if index >= len {
                return Err(FunnelError::OutOfRange { index, len });
            }
        }
        let step = self.steps.remove(from);
        self.steps.insert(to, step);
        Ok(())
    }

    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn evaluate(&self, events: &[AnalyticsEvent]) -> FunnelReport {
        compute_funnel(&self.steps, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Row;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn events(session: &str, names: &[&str]) -> Vec<AnalyticsEvent> {
        let start = Utc::now();
        names
            .iter()
            .enumerate()
            .map(|(i, name)| AnalyticsEvent {
                id: Uuid::new_v4(),
                session_id: session.to_string(),
                event_name: name.to_string(),
                page: None,
                properties: Row::new(),
                created_at: start + Duration::seconds(i as i64),
            })
            .collect()
    }

    fn steps() -> Vec<String> {
        vec!["view".into(), "signup".into(), "purchase".into()]
    }

    #[test]
    fn test_funnel_counts_in_order() {
        let mut all = Vec::new();
        all.extend(events("a", &["view", "signup", "purchase"]));
        all.extend(events("b", &["view", "scroll", "signup"]));
        all.extend(events("c", &["view"]));
        // purchase before view does not count
        all.extend(events("d", &["purchase", "view"]));

        let report = compute_funnel(&steps(), &all);
        let counts: Vec<u64> = report.steps.iter().map(|s| s.sessions).collect();
        assert_eq!(counts, vec![4, 2, 1]);
        assert_eq!(report.steps[0].step_conversion, 100.0);
        assert_eq!(report.steps[1].step_conversion, 50.0);
        assert_eq!(report.steps[2].step_conversion, 50.0);
        assert_eq!(report.overall_conversion, 25.0);
    }

    #[test]
    fn test_empty_funnel() {
        let report = compute_funnel(&steps(), &[]);
        assert!(report.steps.iter().all(|s| s.step_conversion == 0.0));
        assert_eq!(report.overall_conversion, 0.0);

        let report = compute_funnel(&[], &events("a", &["view"]));
        assert!(report.steps.is_empty());
        assert_eq!(report.overall_conversion, 0.0);
    }

    #[test]
    fn test_builder_edits() {
        let mut builder = FunnelBuilder::from_steps(["view", "signup"]).unwrap();
        assert_eq!(
            builder.add("view").unwrap_err(),
            FunnelError::DuplicateStep("view".into())
        );
        assert_eq!(builder.add("  ").unwrap_err(), FunnelError::EmptyStep);

        builder.add("purchase").unwrap();
        builder.move_step(2, 0).unwrap();
        assert_eq!(builder.steps(), ["purchase", "view", "signup"]);

        assert!(builder.remove("view"));
        assert!(!builder.remove("view"));
        assert_eq!(builder.len(), 2);
        assert!(matches!(builder.move_step(0, 5), Err(FunnelError::OutOfRange { .. })));
    }
}
