//! Directory checks.

use std::path::{Path, PathBuf};

use crate::error::{DirError, Result};

/// Checks that `path` exists and is a directory.
///
/// # Errors
///
/// Returns an error if the path is missing, unreadable or not a directory.
pub fn is_valid_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DirError::NotADirectory {
            path: path.to_path_buf(),
        }
        .into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DirError::NotFound {
            path: path.to_path_buf(),
        }
        .into()),
        Err(e) => Err(DirError::access(path, e.to_string()).into()),
    }
}

/// Checks that `path` is a directory with at least one entry.
///
/// # Errors
///
/// Returns an error if the path is empty, missing, not a directory, or has
/// no entries.
pub fn dir_exists_and_has_content(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(DirError::EmptyPath {
            name: "directory path",
        }
        .into());
    }

    is_valid_dir(path)?;

    let mut entries =
        std::fs::read_dir(path).map_err(|e| DirError::access(path, e.to_string()))?;
    if entries.next().is_none() {
        return Err(DirError::Empty {
            path: path.to_path_buf(),
        }
        .into());
    }

    Ok(())
}

/// Lists the direct children of a directory, sorted by path.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn list_dir(path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let path = path.as_ref();
    let mut children = std::fs::read_dir(path)
        .map_err(|e| DirError::access(path, e.to_string()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| DirError::access(path, e.to_string()))?;
    children.sort();
    Ok(children)
}
