//! Discovery of `.tfvars` files.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DirError, Result};
use crate::utils::{has_extension, list_dir};

/// Returns every `.tfvars` file under `dir`, recursively, as paths relative
/// to `dir`, sorted.
///
/// # Errors
///
/// Returns an error if `dir` is empty or a directory cannot be listed.
pub fn tfvars_in_dir(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(DirError::EmptyPath { name: "workdir" }.into());
    }

    let mut found = Vec::new();
    collect(dir, dir, &mut found)?;
    found.sort();

    debug!("Found {} .tfvars file(s) under {}", found.len(), dir.display());
    Ok(found)
}

fn collect(base: &Path, dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in list_dir(dir)? {
        if entry.is_dir() {
            collect(base, &entry, found)?;
        } else if has_extension(&entry, ".tfvars") {
            let relative = entry
                .strip_prefix(base)
                .map_err(|e| DirError::access(&entry, e.to_string()))?;
            found.push(relative.to_path_buf());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_finds_nested_tfvars() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let nested = temp.path().join("env");
        std::fs::create_dir(&nested).expect("Failed to create dir");
        std::fs::write(temp.path().join("b.tfvars"), "a = 1\n").expect("write failed");
        std::fs::write(nested.join("a.tfvars"), "a = 2\n").expect("write failed");
        std::fs::write(temp.path().join("main.tf"), "").expect("write failed");
        std::fs::write(temp.path().join("vars.tfvars.json"), "{}").expect("write failed");

        let files = tfvars_in_dir(temp.path()).expect("scan should succeed");
        assert_eq!(
            files,
            vec![PathBuf::from("b.tfvars"), PathBuf::from("env").join("a.tfvars")]
        );
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(tfvars_in_dir("").is_err());
    }
}
