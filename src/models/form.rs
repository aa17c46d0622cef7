//! Lead-capture forms and their submissions
//!
//! A form is a list of field definitions owned by the back-office. Public
//! submissions are checked against the definition before they are stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

use super::{is_valid_email, require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::{Row, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Textarea,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Allowed values for `select` fields
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Form {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl Form {
    /// Check submitted values against the field definitions
    pub fn validate_submission(&self, data: &Row) -> Result<(), ValidationError> {
        if !self.is_active {
            return Err(ValidationError::new("form", "is not accepting submissions"));
        }

        for field in &self.fields {
            let value = data.get(&field.name).unwrap_or(&Value::Null);

            if field.kind == FieldKind::Checkbox {
                if field.required && value != &Value::Bool(true) {
                    return Err(ValidationError::new(&field.name, "must be checked"));
                }
                continue;
            }

            let text = match value {
                Value::Null => "",
                Value::String(s) => s.trim(),
                _ => {
                    return Err(ValidationError::new(&field.name, "must be text"));
                }
            };

            if text.is_empty() {
                if field.required {
                    return Err(ValidationError::new(&field.name, "is required"));
                }
                continue;
            }

            match field.kind {
                FieldKind::Email if !is_valid_email(text) => {
                    return Err(ValidationError::new(&field.name, "is not a valid email address"));
                }
                FieldKind::Select if !field.options.iter().any(|o| o == text) => {
                    return Err(ValidationError::new(
                        &field.name,
                        format!("'{}' is not one of the allowed options", text),
                    ));
                }
                _ => {}
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<FormField>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for NewForm {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        if self.fields.is_empty() {
            return Err(ValidationError::new("fields", "a form needs at least one field"));
        }

        let mut names = HashSet::new();
        for field in &self.fields {
            require("fields.name", &field.name)?;
            if !names.insert(field.name.as_str()) {
                return Err(ValidationError::new(
                    "fields",
                    format!("duplicate field '{}'", field.name),
                ));
            }
            if field.kind == FieldKind::Select && field.options.is_empty() {
                return Err(ValidationError::new(
                    "fields",
                    format!("select field '{}' has no options", field.name),
                ));
            }
        }
        Ok(())
    }
}

impl Record for Form {
    const TABLE: Table = Table::Forms;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewForm;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Form {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        fields.extend(self.description.as_deref());
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub form_id: Uuid,
    #[serde(default)]
    pub data: Row,
    #[serde(default)]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFormSubmission {
    pub form_id: Uuid,
    #[serde(default)]
    pub data: Row,
    #[serde(default)]
    pub source: Option<String>,
}

/// Field-level checks need the form definition; see [`Form::validate_submission`].
impl Validate for NewFormSubmission {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.data.is_empty() {
            return Err(ValidationError::new("data", "submission is empty"));
        }
        Ok(())
    }
}

impl Record for FormSubmission {
    const TABLE: Table = Table::FormSubmissions;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewFormSubmission;
    const MANAGED_COLUMNS: &'static [&'static str] = &["form_id", "data"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for FormSubmission {
    fn search_fields(&self) -> Vec<&str> {
        self.data.values().filter_map(Value::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn newsletter_form() -> Form {
        Form {
            id: Uuid::new_v4(),
            name: "Newsletter".to_string(),
            description: None,
            fields: vec![
                FormField {
                    name: "email".into(),
                    label: "Email".into(),
                    kind: FieldKind::Email,
                    required: true,
                    options: vec![],
                },
                FormField {
                    name: "interest".into(),
                    label: "Interest".into(),
                    kind: FieldKind::Select,
                    required: false,
                    options: vec!["seo".into(), "ads".into()],
                },
                FormField {
                    name: "consent".into(),
                    label: "I agree".into(),
                    kind: FieldKind::Checkbox,
                    required: true,
                    options: vec![],
                },
            ],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn data(v: Value) -> Row {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_submission() {
        let form = newsletter_form();
        let submission = data(json!({"email": "x@y.io", "interest": "seo", "consent": true}));
        assert!(form.validate_submission(&submission).is_ok());
    }

    #[test]
    fn test_optional_fields_may_be_blank() {
        let form = newsletter_form();
        let submission = data(json!({"email": "x@y.io", "interest": "  ", "consent": true}));
        assert!(form.validate_submission(&submission).is_ok());
    }

    #[test]
    fn test_submission_errors() {
        let form = newsletter_form();

        let err = form
            .validate_submission(&data(json!({"consent": true})))
            .unwrap_err();
        assert_eq!(err.field, "email");

        let err = form
            .validate_submission(&data(json!({"email": "nope", "consent": true})))
            .unwrap_err();
        assert_eq!(err.message, "is not a valid email address");

        let err = form
            .validate_submission(&data(json!({"email": "x@y.io", "interest": "print", "consent": true})))
            .unwrap_err();
        assert_eq!(err.field, "interest");

        let err = form
            .validate_submission(&data(json!({"email": "x@y.io"})))
            .unwrap_err();
        assert_eq!(err.field, "consent");
    }

    #[test]
    fn test_inactive_form_rejects() {
        let mut form = newsletter_form();
        form.is_active = false;
        let err = form
            .validate_submission(&data(json!({"email": "x@y.io", "consent": true})))
            .unwrap_err();
        assert_eq!(err.field, "form");
    }

    #[test]
    fn test_select_needs_options() {
        let form = NewForm {
            name: "Broken".into(),
            description: None,
            fields: vec![FormField {
                name: "pick".into(),
                label: "Pick".into(),
                kind: FieldKind::Select,
                required: false,
                options: vec![],
            }],
            is_active: true,
        };
        assert!(form.validate().is_err());
    }
}
