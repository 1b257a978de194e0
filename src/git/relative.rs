//! Module paths relative to the enclosing repository.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DirError, Result};

use super::finder::{DEFAULT_SEARCH_LEVELS, RepoLocation, find_repo_root};

/// Resolves the repository that contains the current directory and returns
/// `tf_dir` relative to it.
///
/// A relative `tf_dir` is interpreted from the current directory. An
/// absolute `tf_dir` must lie under the repository root.
///
/// # Errors
///
/// Returns an error if `tf_dir` is empty, the current directory is not in a
/// repository, or an absolute `tf_dir` is outside of it.
pub fn relative_path_from_repo(tf_dir: impl AsRef<Path>) -> Result<RepoLocation> {
    let cwd = std::env::current_dir()?;
    relative_path_from(&cwd, tf_dir.as_ref())
}

pub(crate) fn relative_path_from(cwd: &Path, tf_dir: &Path) -> Result<RepoLocation> {
    if tf_dir.as_os_str().is_empty() {
        return Err(DirError::EmptyPath { name: "tf_dir" }.into());
    }

    let root = find_repo_root(cwd, DEFAULT_SEARCH_LEVELS)?.root;
    debug!("The git repo root is {}", root.display());

    let target = if tf_dir.is_absolute() {
        normalize(tf_dir)
    } else {
        normalize(&cwd.join(tf_dir))
    };

    let relative = target
        .strip_prefix(&root)
        .map_err(|_| DirError::OutsideRepository {
            path: tf_dir.to_path_buf(),
            root: root.clone(),
        })?
        .to_path_buf();

    Ok(RepoLocation { root, relative })
}

/// Lexically removes `.` and `..` components.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfTestError;
    use crate::git::GIT_MARKER;
    use tempfile::TempDir;

    fn layout() -> TempDir {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::create_dir_all(temp.path().join(GIT_MARKER)).expect("create failed");
        std::fs::create_dir_all(temp.path().join("test/simple")).expect("create failed");
        std::fs::create_dir_all(temp.path().join("test/data/tf-random")).expect("create failed");
        temp
    }

    #[test]
    fn test_relative_input_is_resolved_from_cwd() {
        let temp = layout();
        let cwd = temp.path().join("test/simple");

        let location =
            relative_path_from(&cwd, Path::new("../data/tf-random")).expect("should resolve");

        assert_eq!(location.root, temp.path());
        assert_eq!(location.relative, Path::new("test/data/tf-random"));
    }

    #[test]
    fn test_absolute_input_inside_repo() {
        let temp = layout();
        let cwd = temp.path().join("test/simple");
        let module = temp.path().join("test/data/tf-random");

        let location = relative_path_from(&cwd, &module).expect("should resolve");
        assert_eq!(location.relative, Path::new("test/data/tf-random"));
    }

    #[test]
    fn test_absolute_input_with_parent_components() {
        let temp = layout();
        let cwd = temp.path().join("test/simple");
        let module = temp.path().join("test/../test/./data/tf-random");

        let location = relative_path_from(&cwd, &module).expect("should resolve");
        assert_eq!(location.relative, Path::new("test/data/tf-random"));

        let escaping = temp.path().join("test/../../elsewhere");
        assert!(relative_path_from(&cwd, &escaping).is_err());
    }

    #[test]
    fn test_absolute_input_outside_repo() {
        let temp = layout();
        let other = TempDir::new().expect("Failed to create temp dir");

        let err = relative_path_from(temp.path(), other.path()).unwrap_err();
        assert!(matches!(
            err,
            TfTestError::Dir(DirError::OutsideRepository { .. })
        ));
    }

    #[test]
    fn test_empty_tf_dir() {
        let temp = layout();
        assert!(relative_path_from(temp.path(), Path::new("")).is_err());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), Path::new("/a/c/d"));
    }
}
