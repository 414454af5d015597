//! File-change summary for the `file_analysis` section of the output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One entry of the PR's `files` array.
#[derive(Debug, Clone, Deserialize)]
pub struct FileRecord {
    pub filename: String,
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
}

fn unknown_status() -> String {
    "unknown".to_owned()
}

/// Counts of changed files by status, extension and parent directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileChangeSummary {
    pub total_files: usize,
    pub files_by_status: BTreeMap<String, usize>,
    /// Keyed by extension with its leading dot; `""` when there is none.
    pub files_by_extension: BTreeMap<String, usize>,
    /// Keyed by parent directory; `"."` for the repository root.
    pub changes_by_path: BTreeMap<String, usize>,
}

impl FileChangeSummary {
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut summary = Self {
            total_files: records.len(),
            ..Self::default()
        };
        for record in records {
            let path = Path::new(&record.filename);
            tracing::debug!(
                file = record.filename.as_str(),
                status = record.status.as_str(),
                additions = record.additions,
                deletions = record.deletions,
                "changed file"
            );
            *summary
                .files_by_status
                .entry(record.status.clone())
                .or_default() += 1;
            *summary.files_by_extension.entry(extension(path)).or_default() += 1;
            *summary.changes_by_path.entry(parent(path)).or_default() += 1;
        }
        summary
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

fn parent(path: &Path) -> String {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_string_lossy().into_owned(),
        _ => ".".to_owned(),
    }
}
