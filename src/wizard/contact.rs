//! Four-step contact wizard
//!
//! ```text
//! 1. Contact   name, email, phone
//! 2. Company   company, website, budget
//! 3. Services  one or more entries from SERVICES
//! 4. Project   message, timeline
//! ```
//!
//! `next` validates only the step being left; `finish` validates all of
//! them. Going back keeps whatever was entered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::StepFlow;
use crate::models::{
    require, require_email, require_http_url, ContactStatus, NewContactSubmission,
    ValidationError,
};

/// Service catalogue as `(id, label)`
pub const SERVICES: &[(&str, &str)] = &[
    ("seo", "Search Engine Optimization"),
    ("ppc", "Pay-Per-Click Advertising"),
    ("social", "Social Media Marketing"),
    ("content", "Content Marketing"),
    ("email", "Email Marketing"),
    ("web_design", "Web Design & Development"),
    ("branding", "Brand Strategy"),
    ("analytics", "Analytics & Reporting"),
];

pub const BUDGET_RANGES: &[&str] = &[
    "under_5k",
    "5k_10k",
    "10k_25k",
    "25k_50k",
    "50k_plus",
];

pub const TIMELINES: &[&str] = &["asap", "1_3_months", "3_6_months", "flexible"];

pub fn service_label(id: &str) -> Option<&'static str> {
    SERVICES.iter().find(|(key, _)| *key == id).map(|(_, label)| *label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStep {
    Contact,
    Company,
    Services,
    Project,
}

impl ContactStep {
    pub const ALL: [ContactStep; 4] = [
        ContactStep::Contact,
        ContactStep::Company,
        ContactStep::Services,
        ContactStep::Project,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ContactStep::Contact => "Contact details",
            ContactStep::Company => "Company",
            ContactStep::Services => "Services",
            ContactStep::Project => "Project",
        }
    }
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Step {step} ({title}): {source}")]
    InvalidStep {
        step: usize,
        title: &'static str,
        #[source]
        source: ValidationError,
    },

    #[error("Wizard is on step {step} of {total}; finish is only available on the last step")]
    NotFinished { step: usize, total: usize },

    #[error("Unknown service '{0}'")]
    UnknownService(String),
}

impl WizardError {
    /// The field-level error behind a failed step, if any
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            WizardError::InvalidStep { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetails {
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub message: String,
    #[serde(default)]
    pub timeline: Option<String>,
}

/// Everything the wizard collects, as posted in one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardSubmission {
    pub contact: ContactDetails,
    #[serde(default)]
    pub company: CompanyDetails,
    #[serde(default)]
    pub services: Vec<String>,
    pub project: ProjectDetails,
}

/// Produced by a completed wizard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactSummary {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub budget: Option<String>,
    pub services: Vec<String>,
    pub message: String,
    pub timeline: Option<String>,
    /// Number of steps walked to produce this summary
    pub steps_completed: usize,
}

impl From<ContactSummary> for NewContactSubmission {
    fn from(summary: ContactSummary) -> Self {
        NewContactSubmission {
            name: summary.name,
            email: summary.email,
            phone: summary.phone,
            company: summary.company,
            website: summary.website,
            budget: summary.budget,
            services: summary.services,
            message: summary.message,
            timeline: summary.timeline,
            status: ContactStatus::New,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactWizard {
    flow: StepFlow,
    data: WizardSubmission,
}

impl Default for ContactWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactWizard {
    pub fn new() -> Self {
        Self {
            flow: StepFlow::new(ContactStep::ALL.len()),
            data: WizardSubmission::default(),
        }
    }

    /// Walk a complete submission through every step
    pub fn complete(submission: WizardSubmission) -> Result<ContactSummary, WizardError> {
        let mut wizard = Self::new();
        wizard.data = submission;
        while !wizard.flow.is_last() {
            wizard.next()?;
        }
        wizard.finish()
    }

    pub fn step(&self) -> ContactStep {
        ContactStep::ALL[self.flow.current()]
    }

    pub fn flow(&self) -> &StepFlow {
        &self.flow
    }

    pub fn progress(&self) -> f64 {
        self.flow.progress()
    }

    pub fn data(&self) -> &WizardSubmission {
        &self.data
    }

    pub fn set_contact(&mut self, contact: ContactDetails) {
        self.data.contact = contact;
    }

    pub fn set_company(&mut self, company: CompanyDetails) {
        self.data.company = company;
    }

    pub fn set_project(&mut self, project: ProjectDetails) {
        self.data.project = project;
    }

    /// Select or deselect a catalogue service; returns whether it is now selected
    pub fn toggle_service(&mut self, id: &str) -> Result<bool, WizardError> {
        if service_label(id).is_none() {
            return Err(WizardError::UnknownService(id.to_string()));
        }
        if let Some(pos) = self.data.services.iter().position(|s| s == id) {
            self.data.services.remove(pos);
            Ok(false)
        } else {
            self.data.services.push(id.to_string());
            Ok(true)
        }
    }

    /// Validate the current step and move forward; stays put on the last step
    pub fn next(&mut self) -> Result<ContactStep, WizardError> {
        self.check(self.step())?;
        self.flow.next();
        Ok(self.step())
    }

    pub fn back(&mut self) -> ContactStep {
        self.flow.back();
        self.step()
    }

    pub fn finish(&self) -> Result<ContactSummary, WizardError> {
        if !self.flow.is_last() {
            return Err(WizardError::NotFinished {
                step: self.flow.step_number(),
                total: self.flow.total(),
            });
        }
        for step in ContactStep::ALL {
            self.check(step)?;
        }

        let data = self.data.clone();
        Ok(ContactSummary {
            name: data.contact.name.trim().to_string(),
            email: data.contact.email.trim().to_string(),
            phone: non_blank(data.contact.phone),
            company: non_blank(data.company.company),
            website: non_blank(data.company.website),
            budget: non_blank(data.company.budget),
            services: data.services,
            message: data.project.message.trim().to_string(),
            timeline: non_blank(data.project.timeline),
            steps_completed: self.flow.total(),
        })
    }

    fn check(&self, step: ContactStep) -> Result<(), WizardError> {
        if step == ContactStep::Services {
            if let Some(unknown) = self.data.services.iter().find(|s| service_label(s).is_none()) {
                return Err(WizardError::UnknownService(unknown.clone()));
            }
        }
        let index = ContactStep::ALL
            .iter()
            .position(|s| *s == step)
            .unwrap_or_default();
        self.validate_step(step)
            .map_err(|source| WizardError::InvalidStep {
                step: index + 1,
                title: step.title(),
                source,
            })
    }

    fn validate_step(&self, step: ContactStep) -> Result<(), ValidationError> {
        let data = &self.data;
        match step {
            ContactStep::Contact => {
                require("name", &data.contact.name)?;
                require_email("email", &data.contact.email)
            }
            ContactStep::Company => {
                if let Some(website) = present(&data.company.website) {
                    require_http_url("website", website)?;
                }
                one_of("budget", &data.company.budget, BUDGET_RANGES)
            }
            ContactStep::Services => {
                if data.services.is_empty() {
                    return Err(ValidationError::new("services", "select at least one service"));
                }
                Ok(())
            }
            ContactStep::Project => {
                require("message", &data.project.message)?;
                one_of("timeline", &data.project.timeline, TIMELINES)
            }
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn non_blank(value: Option<String>) -> Option<String> {
    present(&value).map(str::to_string)
}

fn one_of(field: &str, value: &Option<String>, allowed: &[&str]) -> Result<(), ValidationError> {
    match present(value) {
        Some(v) if !allowed.contains(&v) => Err(ValidationError::new(
            field,
            format!("'{}' is not one of: {}", v, allowed.join(", ")),
        )),
        _ => Ok(()),
    }
}
