use serde::Serialize;
use std::collections::BTreeMap;

use super::{RepoResult, Repository};
use crate::models::MediaFile;

/// Files with no folder are grouped under this name
pub const UNFILED: &str = "unfiled";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FolderSummary {
    pub folder: String,
    pub count: usize,
    pub total_bytes: u64,
}

impl Repository<MediaFile> {
    /// Per-folder file counts and sizes, sorted by folder name
    pub async fn folders(&self) -> RepoResult<Vec<FolderSummary>> {
        Ok(summarize_folders(&self.all().await?))
    }
}

pub fn summarize_folders(files: &[MediaFile]) -> Vec<FolderSummary> {
    let mut folders: BTreeMap<&str, (usize, u64)> = BTreeMap::new();
    for file in files {
        let name = file
            .folder
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(UNFILED);
        let entry = folders.entry(name).or_default();
        entry.0 += 1;
        entry.1 += file.size_bytes;
    }

    folders
        .into_iter()
        .map(|(folder, (count, total_bytes))| FolderSummary {
            folder: folder.to_string(),
            count,
            total_bytes,
        })
        .collect()
}
