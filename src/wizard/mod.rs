//! Multi-step forms
//!
//! [`StepFlow`] is the linear step pointer shared by every wizard: it only
//! moves one step at a time and never leaves `0..total`. [`ContactWizard`]
//! is the four-step contact form from the public site.

mod contact;

pub use contact::{
    service_label, CompanyDetails, ContactDetails, ContactStep, ContactSummary, ContactWizard,
    ProjectDetails, WizardError, WizardSubmission, BUDGET_RANGES, SERVICES, TIMELINES,
};

use serde::{Deserialize, Serialize};

use crate::analytics::round2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFlow {
    current: usize,
    total: usize,
}

impl StepFlow {
    /// A flow always has at least one step
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total: total.max(1),
        }
    }

    /// Zero-based index of the current step
    pub fn current(&self) -> usize {
        self.current
    }

    /// One-based step number for display ("Step 2 of 4")
    pub fn step_number(&self) -> usize {
        self.current + 1
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.total
    }

    /// Advance one step; returns false on the last step
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Go back one step; returns false on the first step
    pub fn back(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Percentage of steps reached, counting the current one
    pub fn progress(&self) -> f64 {
        round2(self.step_number() as f64 / self.total as f64 * 100.0)
    }
}
