//! Isolated copies of a repository for parallel runs.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{DirError, Result};
use crate::git::{DEFAULT_SEARCH_LEVELS, find_repo_root};

/// Hidden entries that are still copied.
const KEPT_HIDDEN: &[&str] = &[".terraform-version", ".terraform.lock.hcl"];

/// Entries never copied.
const SKIPPED: &[&str] = &[
    "terraform.tfstate",
    "terraform.tfstate.backup",
    "terraform.tfvars",
    "terraform.tfvars.json",
];

/// A repository copied into a temporary directory. The copy is removed when
/// this value is dropped.
#[derive(Debug)]
pub struct IsolatedCopy {
    dir: TempDir,
    module_dir: PathBuf,
}

impl IsolatedCopy {
    /// Path of the module inside the copy.
    #[must_use]
    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn temp_root(&self) -> &Path {
        self.dir.path()
    }
}

/// Copies the repository containing `tf_dir` into a fresh temporary
/// directory and returns the location of the module in the copy.
///
/// # Errors
///
/// Returns an error if `tf_dir` is not inside a Git repository or the copy
/// fails.
pub fn copy_module_to_temp(tf_dir: impl AsRef<Path>) -> Result<IsolatedCopy> {
    let tf_dir = tf_dir.as_ref();
    if tf_dir.as_os_str().is_empty() {
        return Err(DirError::EmptyPath { name: "tf_dir" }.into());
    }

    let location = find_repo_root(tf_dir, DEFAULT_SEARCH_LEVELS)?;

    let dir = tempfile::Builder::new().prefix("tftest-").tempdir()?;
    let repo_name = location
        .root
        .file_name()
        .map_or_else(|| PathBuf::from("repo"), PathBuf::from);
    let dest_root = dir.path().join(repo_name);

    copy_tree(&location.root, &dest_root)?;

    let module_dir = if location.is_root() {
        dest_root
    } else {
        dest_root.join(&location.relative)
    };

    info!(
        "Copied {} to {} for an isolated run",
        location.full_path().display(),
        module_dir.display()
    );

    Ok(IsolatedCopy { dir, module_dir })
}

/// Returns true if an entry with this name is copied.
pub(crate) fn should_copy(name: &OsStr) -> bool {
    let Some(name) = name.to_str() else {
        return true;
    };

    if KEPT_HIDDEN.contains(&name) {
        return true;
    }

    !name.starts_with('.') && !SKIPPED.contains(&name)
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    let copy_err = |e: std::io::Error| DirError::CopyFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        message: e.to_string(),
    };

    std::fs::create_dir_all(to).map_err(copy_err)?;

    for entry in std::fs::read_dir(from).map_err(copy_err)? {
        let entry = entry.map_err(copy_err)?;
        let name = entry.file_name();
        if !should_copy(&name) {
            debug!("Skipping {}", entry.path().display());
            continue;
        }

        let source = entry.path();
        let target = to.join(&name);
        let file_type = entry.file_type().map_err(copy_err)?;

        if file_type.is_symlink() {
            copy_symlink(&source, &target)?;
        } else if file_type.is_dir() {
            copy_tree(&source, &target)?;
        } else {
            std::fs::copy(&source, &target).map_err(|e| DirError::CopyFailed {
                from: source.clone(),
                to: target.clone(),
                message: e.to_string(),
            })?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    let link_err = |e: std::io::Error| DirError::CopyFailed {
        from: source.to_path_buf(),
        to: target.to_path_buf(),
        message: e.to_string(),
    };

    let link = std::fs::read_link(source).map_err(link_err)?;
    std::os::unix::fs::symlink(link, target).map_err(link_err)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> Result<()> {
    if source.is_dir() {
        copy_tree(source, target)
    } else {
        std::fs::copy(source, target).map_err(|e| DirError::CopyFailed {
            from: source.to_path_buf(),
            to: target.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
