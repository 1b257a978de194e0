//! Upward search for the `.git` marker.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use crate::error::{DirError, Result};
use crate::utils::is_valid_dir;

/// Name of the marker directory that identifies a repository root.
pub const GIT_MARKER: &str = ".git";

/// Number of parent levels inspected when the caller has no better bound.
pub const DEFAULT_SEARCH_LEVELS: usize = 32;

/// Where a path sits inside a Git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoLocation {
    /// Absolute path of the repository root.
    pub root: PathBuf,
    /// Path from `root` back to the queried directory. Empty when the
    /// queried directory is the root itself.
    pub relative: PathBuf,
}

impl RepoLocation {
    /// Joins the relative offset back onto the root.
    #[must_use]
    pub fn full_path(&self) -> PathBuf {
        if self.relative.as_os_str().is_empty() {
            self.root.clone()
        } else {
            self.root.join(&self.relative)
        }
    }

    /// Returns true if the queried directory is the repository root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.relative.as_os_str().is_empty()
    }
}

/// Searches `start` and up to `levels` of its parents for a `.git`
/// directory.
///
/// Level `0` inspects only `start`. The search also stops at the filesystem
/// root.
///
/// # Errors
///
/// Returns an error if `start` is empty, does not exist, is not a directory,
/// or no marker is found within the bound.
pub fn find_repo_root(start: impl AsRef<Path>, levels: usize) -> Result<RepoLocation> {
    let start = start.as_ref();
    if start.as_os_str().is_empty() {
        return Err(DirError::EmptyPath {
            name: "directory path",
        }
        .into());
    }

    let original = std::path::absolute(start).map_err(|e| DirError::access(start, e.to_string()))?;
    is_valid_dir(&original)?;

    for candidate in original.ancestors().take(levels.saturating_add(1)) {
        let marker = candidate.join(GIT_MARKER);
        match std::fs::metadata(&marker) {
            Ok(meta) if meta.is_dir() => {
                let relative = original
                    .strip_prefix(candidate)
                    .map_err(|e| DirError::access(&original, e.to_string()))?
                    .to_path_buf();

                debug!(
                    "Found git root {} for {} (offset: {})",
                    candidate.display(),
                    original.display(),
                    relative.display()
                );

                return Ok(RepoLocation {
                    root: candidate.to_path_buf(),
                    relative,
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(DirError::access(marker, e.to_string()).into()),
        }
    }

    Err(DirError::RepoNotFound {
        path: start.to_path_buf(),
        levels,
    }
    .into())
}

/// Checks whether `dir` itself is a repository root.
///
/// # Errors
///
/// Returns an error if `dir` is empty, is not a directory, or has no `.git`
/// entry.
pub fn is_git_repository(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(DirError::EmptyPath {
            name: "directory path",
        }
        .into());
    }

    is_valid_dir(dir)?;

    match std::fs::symlink_metadata(dir.join(GIT_MARKER)) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DirError::NotARepository {
            path: dir.to_path_buf(),
        }
        .into()),
        Err(e) => Err(DirError::access(dir, e.to_string()).into()),
    }
}

/// Walks up from `dir` to the filesystem root looking for a `.git` entry.
///
/// Unlike [`find_repo_root`], a `.git` file (as used by worktrees and
/// submodules) also counts.
///
/// # Errors
///
/// Returns an error if the path cannot be made absolute or no marker exists
/// on the way up.
pub fn find_root_by_traversal(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let start = std::path::absolute(dir).map_err(|e| DirError::access(dir, e.to_string()))?;

    start
        .ancestors()
        .find(|candidate| candidate.join(GIT_MARKER).exists())
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            DirError::RepoNotFound {
                path: dir.to_path_buf(),
                levels: start.ancestors().count().saturating_sub(1),
            }
            .into()
        })
}

/// Asks `git rev-parse --show-toplevel` for the root of the repository
/// containing `dir`.
///
/// # Errors
///
/// Returns an error if git cannot be run or `dir` is not inside a
/// repository.
pub fn find_root_using_git(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let git_error = |message: String| DirError::GitCommand {
        path: dir.to_path_buf(),
        message,
    };

    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(dir)
        .output()
        .map_err(|e| git_error(e.to_string()))?;

    if !output.status.success() {
        return Err(git_error(String::from_utf8_lossy(&output.stderr).trim().to_string()).into());
    }

    Ok(PathBuf::from(String::from_utf8_lossy(&output.stdout).trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfTestError;
    use tempfile::TempDir;

    fn repo() -> TempDir {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp.path().join(GIT_MARKER)).expect("Failed to create .git");
        temp
    }

    #[test]
    fn test_find_root_from_nested_dir() {
        let temp = repo();
        let nested = temp.path().join("modules/network/examples/basic");
        std::fs::create_dir_all(&nested).expect("Failed to create nested dir");

        let location = find_repo_root(&nested, 10).expect("root should be found");

        assert_eq!(location.root, temp.path());
        assert_eq!(location.relative, Path::new("modules/network/examples/basic"));
        assert_eq!(location.full_path(), nested);
    }

    #[test]
    fn test_every_nested_level_reconstructs() {
        let temp = repo();
        let mut current = temp.path().to_path_buf();
        for segment in ["a", "b", "c", "d"] {
            current.push(segment);
            std::fs::create_dir_all(&current).expect("Failed to create dir");

            let location = find_repo_root(&current, DEFAULT_SEARCH_LEVELS).expect("root should be found");
            assert_eq!(location.root, temp.path());
            assert_eq!(location.root.join(&location.relative), current);
        }
    }

    #[test]
    fn test_root_itself_has_empty_offset() {
        let temp = repo();

        let location = find_repo_root(temp.path(), 0).expect("root should be found");

        assert_eq!(location.root, temp.path());
        assert!(location.relative.as_os_str().is_empty());
        assert!(location.is_root());
        assert_eq!(location.full_path(), temp.path());
    }

    #[test]
    fn test_level_bound_is_respected() {
        let temp = repo();
        let nested = temp.path().join("one/two/three");
        std::fs::create_dir_all(&nested).expect("Failed to create nested dir");

        assert!(matches!(
            find_repo_root(&nested, 2),
            Err(TfTestError::Dir(DirError::RepoNotFound { levels: 2, .. }))
        ));
        assert!(find_repo_root(&nested, 3).is_ok());
    }

    #[test]
    fn test_git_file_is_not_a_marker_directory() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join(GIT_MARKER), "gitdir: ../elsewhere").expect("write failed");

        assert!(find_repo_root(temp.path(), 0).is_err());
        assert_eq!(
            find_root_by_traversal(temp.path()).expect("traversal should accept a .git file"),
            temp.path()
        );
    }

    #[test]
    fn test_empty_path_is_rejected() {
        assert!(matches!(
            find_repo_root("", 5),
            Err(TfTestError::Dir(DirError::EmptyPath { .. }))
        ));
        assert!(is_git_repository("").is_err());
    }

    #[test]
    fn test_missing_start_dir() {
        let temp = repo();
        assert!(matches!(
            find_repo_root(temp.path().join("missing"), 5),
            Err(TfTestError::Dir(DirError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_is_git_repository() {
        let temp = repo();
        let nested = temp.path().join("sub");
        std::fs::create_dir_all(&nested).expect("Failed to create dir");

        assert!(is_git_repository(temp.path()).is_ok());
        assert!(matches!(
            is_git_repository(&nested),
            Err(TfTestError::Dir(DirError::NotARepository { .. }))
        ));
    }
}
