//! Root-path list parsing.

use std::path::{Path, PathBuf};

use crate::error::SlocError;
use crate::Result;

/// Read a root-path list: one search root per line, blank and whitespace-only
/// lines ignored.
///
/// An unreadable list file is startup-fatal — the only error that aborts a
/// run before any worker starts.
pub fn read_root_list(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| SlocError::RootList {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(parse_root_list(&content))
}

fn parse_root_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
