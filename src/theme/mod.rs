//! Theme Rendering
//!
//! Turns the active theme into CSS custom properties for the public site.
//! Preference overrides stored under `theme.<property>` (e.g.
//! `theme.primary_color`) are layered on top; an override that would not
//! pass theme validation is skipped with a warning.

mod preferences;

pub use preferences::{PreferenceError, PreferenceStore, MAX_KEY_LEN};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::{is_hex_color, Theme, MAX_BORDER_RADIUS};

/// Preference prefix for theme overrides
pub const OVERRIDE_PREFIX: &str = "theme";

/// Resolved theme values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeVars {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub background_color: String,
    pub text_color: String,
    pub font_family: String,
    pub border_radius: u32,
}

impl Default for ThemeVars {
    /// Used when no theme is active
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".to_string(),
            secondary_color: "#0f172a".to_string(),
            accent_color: "#f59e0b".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#111827".to_string(),
            font_family: "Inter, system-ui, sans-serif".to_string(),
            border_radius: 8,
        }
    }
}

impl From<&Theme> for ThemeVars {
    fn from(theme: &Theme) -> Self {
        Self {
            primary_color: theme.primary_color.clone(),
            secondary_color: theme.secondary_color.clone(),
            accent_color: theme.accent_color.clone(),
            background_color: theme.background_color.clone(),
            text_color: theme.text_color.clone(),
            font_family: theme.font_family.clone(),
            border_radius: theme.border_radius,
        }
    }
}

impl ThemeVars {
    /// Apply `theme.*` overrides; returns the properties that were applied
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Value>) -> Vec<String> {
        let mut applied = Vec::new();
        for (property, value) in overrides {
            if self.apply(property, value) {
                applied.push(property.clone());
            } else {
                tracing::warn!(property = %property, value = %value, "Ignoring invalid theme override");
            }
        }
        applied
    }

    fn apply(&mut self, property: &str, value: &Value) -> bool {
        let color_slot = match property {
            "primary_color" => Some(&mut self.primary_color),
            "secondary_color" => Some(&mut self.secondary_color),
            "accent_color" => Some(&mut self.accent_color),
            "background_color" => Some(&mut self.background_color),
            "text_color" => Some(&mut self.text_color),
            _ => None,
        };
        if let Some(slot) = color_slot {
            return match value.as_str() {
                Some(color) if is_hex_color(color) => {
                    *slot = color.to_string();
                    true
                }
                _ => false,
            };
        }

        match property {
            "font_family" => match value.as_str().map(str::trim) {
                // keep the declaration well-formed
                Some(font) if !font.is_empty() && !font.contains([';', '{', '}']) => {
                    self.font_family = font.to_string();
                    true
                }
                _ => false,
            },
            "border_radius" => {
                let radius = value
                    .as_u64()
                    .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()));
                match radius {
                    Some(r) if r <= MAX_BORDER_RADIUS as u64 => {
                        self.border_radius = r as u32;
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Custom properties in declaration order
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        vec![
            ("--color-primary", self.primary_color.clone()),
            ("--color-secondary", self.secondary_color.clone()),
            ("--color-accent", self.accent_color.clone()),
            ("--color-background", self.background_color.clone()),
            ("--color-text", self.text_color.clone()),
            ("--font-family", self.font_family.clone()),
            ("--radius", format!("{}px", self.border_radius)),
        ]
    }

    /// `:root { ... }` block
    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.css_variables() {
            let _ = writeln!(css, "  {}: {};", name, value);
        }
        css.push_str("}\n");
        css
    }
}

/// Resolve the site CSS from the active theme (if any) and stored overrides
pub fn render_css(active: Option<&Theme>, preferences: &PreferenceStore) -> String {
    let mut vars = active.map(ThemeVars::from).unwrap_or_default();
    vars.apply_overrides(&preferences.with_prefix(OVERRIDE_PREFIX));
    vars.to_css()
}
