//! Plain-text document discovery and reading for ingestion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Collect files under `root` whose extension is in `extensions`
/// (case-insensitive), sorted by path. A file path is returned as-is when it
/// matches.
pub fn list_documents(root: &Path, extensions: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
        let path = entry.path();
        if has_allowed_extension(path, extensions) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    files
}

pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Read a document as UTF-8, falling back to lossy decoding.
pub fn read_document(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
    }
}
