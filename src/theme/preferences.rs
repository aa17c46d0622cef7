//! Preference Store
//!
//! Small JSON-file key-value store for per-site preferences (the theme
//! customizer keeps its overrides here under `theme.<property>` keys).
//! Writes go straight to disk, so every `set` survives a restart. A change
//! only becomes visible once it has been written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest accepted key
pub const MAX_KEY_LEN: usize = 128;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid preference key '{0}'")]
    InvalidKey(String),
}

/// On-disk format
#[derive(Serialize, Deserialize)]
struct PreferenceData {
    version: u32,
    values: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct PreferenceStore {
    values: BTreeMap<String, Value>,
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// Open (or start) the store backed by `path`
    pub fn open(path: &Path) -> Result<Self, PreferenceError> {
        let values = if path.exists() {
            Self::load_from_file(path)?
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = %path.display(), entries = values.len(), "Opened preference store");
        Ok(Self {
            values,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            values: BTreeMap::new(),
            path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<BTreeMap<String, Value>, PreferenceError> {
        let reader = BufReader::new(File::open(path)?);
        let data: PreferenceData = serde_json::from_reader(reader).map_err(|e| {
            PreferenceError::Serialization(format!("Failed to load preferences: {}", e))
        })?;
        Ok(data.values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value for `key`, if it holds one
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: Value) -> Result<(), PreferenceError> {
        check_key(key)?;
        let mut next = self.values.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        self.values = next;
        Ok(())
    }

    /// Returns the removed value
    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, PreferenceError> {
        if !self.values.contains_key(key) {
            return Ok(None);
        }
        let mut next = self.values.clone();
        let removed = next.remove(key);
        self.persist(&next)?;
        self.values = next;
        Ok(removed)
    }

    /// Entries under `prefix.`, keyed by the remainder of the key
    pub fn with_prefix(&self, prefix: &str) -> BTreeMap<String, Value> {
        let prefix = format!("{}.", prefix);
        self.values
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(&prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect()
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn persist(&self, values: &BTreeMap<String, Value>) -> Result<(), PreferenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = PreferenceData {
            version: 1,
            values: values.clone(),
        };

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &data).map_err(|e| {
            PreferenceError::Serialization(format!("Failed to persist preferences: {}", e))
        })?;
        writer.flush()?;
        Ok(())
    }
}

fn check_key(key: &str) -> Result<(), PreferenceError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(PreferenceError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() {
        let mut store = PreferenceStore::in_memory();
        store.set("theme.primary_color", json!("#ff0000")).unwrap();
        assert_eq!(store.get_str("theme.primary_color"), Some("#ff0000"));

        assert_eq!(store.remove("theme.primary_color").unwrap(), Some(json!("#ff0000")));
        assert_eq!(store.remove("theme.primary_color").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        {
            let mut store = PreferenceStore::open(&path).unwrap();
            store.set("theme.border_radius", json!(12)).unwrap();
            store.set("sidebar.collapsed", json!(true)).unwrap();
        }

        let store = PreferenceStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("theme.border_radius"), Some(&json!(12)));
    }

    #[test]
    fn test_with_prefix() {
        let mut store = PreferenceStore::in_memory();
        store.set("theme.primary_color", json!("#000000")).unwrap();
        store.set("theme.font_family", json!("Inter")).unwrap();
        store.set("themes.other", json!(1)).unwrap();

        let theme = store.with_prefix("theme");
        assert_eq!(theme.len(), 2);
        assert_eq!(theme["font_family"], json!("Inter"));
    }

    #[test]
    fn test_invalid_keys() {
        let mut store = PreferenceStore::in_memory();
        assert!(matches!(store.set("", json!(1)), Err(PreferenceError::InvalidKey(_))));
        assert!(store.set("has space", json!(1)).is_err());
        assert!(store.set(&"k".repeat(MAX_KEY_LEN + 1), json!(1)).is_err());
    }

    #[test]
    fn test_failed_write_keeps_previous_values() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let mut store = PreferenceStore::open(&blocker.join("preferences.json")).unwrap();
        assert!(matches!(
            store.set("theme.primary_color", json!("#ff0000")),
            Err(PreferenceError::Io(_))
        ));
        assert!(store.get("theme.primary_color").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_remove_keeps_value() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");
        let mut store = PreferenceStore::open(&path).unwrap();
        store.set("sidebar.collapsed", json!(true)).unwrap();

        // Replace the directory with a file so the next write fails
        std::fs::remove_dir_all(dir.path().join("prefs")).unwrap();
        std::fs::write(dir.path().join("prefs"), "").unwrap();

        assert!(store.remove("sidebar.collapsed").is_err());
        assert_eq!(store.get("sidebar.collapsed"), Some(&json!(true)));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PreferenceStore::open(&path),
            Err(PreferenceError::Serialization(_))
        ));
    }
}
