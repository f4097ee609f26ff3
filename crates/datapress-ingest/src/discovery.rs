//! Source-file discovery.

use crate::error::{IngestError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files directly under `dir` whose names match `pattern`, sorted by path.
pub fn matching_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let compiled = glob::Pattern::new(pattern).map_err(|source| IngestError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if compiled.matches_with(name, match_opts) {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), pattern, count = files.len(), "discovered source files");
    Ok(files)
}

/// All files under `dir` (recursively) with the given extension, sorted by
/// path. Extension comparison is exact, matching shell-glob behavior.
pub fn walk_files_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|source| IngestError::DirectoryRead {
            path: current.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| IngestError::DirectoryRead {
                path: current.clone(),
                source,
            })?;
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
