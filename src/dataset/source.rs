//! Source discovery for dataset inputs.
//!
//! An input path is either a single file, used as-is, or a directory that is
//! walked recursively for CSV files.

use super::error::DatasetError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Finds the files that make up a dataset.
pub struct SourceScanner {
    root: PathBuf,
    extensions: Vec<String>,
}

impl SourceScanner {
    /// Create a scanner for `.csv` files under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: vec!["csv".to_string()],
        }
    }

    /// List the files to load, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>, DatasetError> {
        let metadata = std::fs::metadata(&self.root).map_err(|source| DatasetError::Io {
            path: self.root.display().to_string(),
            source,
        })?;

        // An explicit file is loaded whatever its extension
        if metadata.is_file() {
            return Ok(vec![self.root.clone()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name().to_str()));

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.matches(entry.path()) {
                debug!("Found source {}", entry.path().display());
                files.push(entry.into_path());
            }
        }

        if files.is_empty() {
            return Err(DatasetError::NoSources {
                path: self.root.display().to_string(),
            });
        }

        files.sort();
        Ok(files)
    }

    /// Check if a file has one of the accepted extensions.
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&e.to_lowercase()))
            .unwrap_or(false)
    }
}

fn is_hidden(name: Option<&str>) -> bool {
    name.map(|n| n.starts_with('.')).unwrap_or(false)
}
