//! Media library entries
//!
//! The file bytes live in the hosted backend's object storage; this table
//! only tracks metadata and the public URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, require_http_url, Record, Validate, ValidationError};
use crate::search::Searchable;
use crate::store::Table;

/// Uploads above this size are rejected (50 MB)
pub const MAX_MEDIA_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
    Other,
}

impl MediaKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let lower = content_type.to_ascii_lowercase();
        match lower.split('/').next().unwrap_or_default() {
            "image" => MediaKind::Image,
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            "text" => MediaKind::Document,
            "application"
                if lower.ends_with("/pdf")
                    || lower.contains("document")
                    || lower.contains("msword")
                    || lower.contains("spreadsheet")
                    || lower.contains("presentation") =>
            {
                MediaKind::Document
            }
            _ => MediaKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MediaFile {
    pub fn kind(&self) -> MediaKind {
        MediaKind::from_content_type(&self.content_type)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMediaFile {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
}

impl Validate for NewMediaFile {
    fn validate(&self) -> Result<(), ValidationError> {
        require("file_name", &self.file_name)?;
        if !self.content_type.contains('/') {
            return Err(ValidationError::new("content_type", "must be a MIME type"));
        }
        if self.size_bytes > MAX_MEDIA_BYTES {
            return Err(ValidationError::new("size_bytes", "file exceeds 50 MB"));
        }
        require_http_url("url", &self.url)
    }
}

impl Record for MediaFile {
    const TABLE: Table = Table::MediaFiles;
    const STATUS_COLUMN: Option<&'static str> = None;
    type New = NewMediaFile;

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Searchable for MediaFile {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.file_name.as_str()];
        fields.extend(self.alt_text.as_deref());
        fields.extend(self.folder.as_deref());
        fields
    }
}
