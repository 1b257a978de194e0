//! Git repository root resolution.
//!
//! Fixtures are addressed relative to the repository that contains them, so
//! that a module can be copied together with its sibling modules into an
//! isolated directory for parallel runs.

mod finder;
mod relative;

pub use finder::{
    DEFAULT_SEARCH_LEVELS, GIT_MARKER, RepoLocation, find_repo_root, find_root_by_traversal,
    find_root_using_git, is_git_repository,
};
pub use relative::relative_path_from_repo;
