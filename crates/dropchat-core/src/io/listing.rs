//! Snapshot directory listings with tail and cursor queries.
//!
//! The single read path for both message polling and presence scanning. Each
//! call re-reads the directory fully — there is no persistent watch, because
//! change notification on network file systems is unreliable. Listings
//! expose only visible files: subdirectories and dot-prefixed names (temp
//! files, the compaction lock) are skipped.

use crate::io::error::StoreError;
use std::fs;
use std::path::Path;

/// Result of a [`since`] query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinceResult {
    /// Names strictly greater than the cursor, ascending.
    pub names: Vec<String>,
    /// Total names examined, for instrumentation.
    pub examined: usize,
}

/// Return the `n` lexicographically-largest file names in `dir`, ascending.
///
/// `n == 0` returns an empty listing without touching the file system.
///
/// # Errors
///
/// [`StoreError::DirectoryMissing`] when `dir` is absent (feature
/// unavailable, retry later); [`StoreError::Io`] for other failures.
pub fn tail(dir: &Path, n: usize) -> Result<Vec<String>, StoreError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut names = list_sorted(dir)?;
    if names.len() > n {
        names.drain(..names.len() - n);
    }
    Ok(names)
}

/// Return the file names in `dir` strictly greater than `cursor` (string
/// comparison), ascending. An empty cursor returns every visible file.
///
/// # Errors
///
/// Same taxonomy as [`tail`].
pub fn since(dir: &Path, cursor: &str) -> Result<SinceResult, StoreError> {
    let names = list_sorted(dir)?;
    let examined = names.len();
    let names = names
        .into_iter()
        .filter(|name| name.as_str() > cursor)
        .collect();
    Ok(SinceResult { names, examined })
}

/// Full sorted snapshot of the visible file names in `dir`.
fn list_sorted(dir: &Path) -> Result<Vec<String>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::from_dir_io(dir, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => {
                if !name.starts_with('.') {
                    names.push(name);
                }
            }
            Err(raw) => {
                // Non-UTF-8 names cannot have been produced by this system.
                tracing::warn!("skipping non-UTF-8 entry {raw:?} in {}", dir.display());
            }
        }
    }
    names.sort_unstable();
    Ok(names)
}
