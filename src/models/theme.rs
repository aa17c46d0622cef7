//! Site themes managed by the theme customizer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{is_hex_color, require, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: Uuid,
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    /// Corner radius in pixels
    #[serde(default)]
    pub border_radius: u32,
    #[serde(default)]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTheme {
    pub name: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    #[serde(default)]
    pub border_radius: u32,
    #[serde(default)]
    pub is_active: bool,
}

pub const MAX_BORDER_RADIUS: u32 = 64;

impl Validate for NewTheme {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("font_family", &self.font_family)?;
        for (field, color) in [
            ("primary_color", &self.primary_color),
            ("secondary_color", &self.secondary_color),
            ("accent_color", &self.accent_color),
            ("background_color", &self.background_color),
            ("text_color", &self.text_color),
        ] {
            if !is_hex_color(color) {
                return Err(ValidationError::new(field, "must be a hex color like #1a2b3c"));
            }
        }
        if self.border_radius > MAX_BORDER_RADIUS {
            return Err(ValidationError::new(
                "border_radius",
                format!("must be at most {}px", MAX_BORDER_RADIUS),
            ));
        }
        Ok(())
    }
}

impl Record for Theme {
    const TABLE: Table = Table::Themes;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewTheme;
    const MANAGED_COLUMNS: &'static [&'static str] = &["is_active"];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for Theme {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.font_family.as_str()]
    }
}
