//! Terragrunt module detection.

use std::path::Path;

use crate::error::{Result, ValidationError};
use crate::utils::is_valid_dir;

use super::terraform::is_a_hcl_file;

/// File that marks a directory as a Terragrunt module.
pub const TERRAGRUNT_CONFIG: &str = "terragrunt.hcl";

/// Checks that the directory exists and carries a non-empty `terragrunt.hcl`.
///
/// # Errors
///
/// Returns an error if the directory is missing or the config file is
/// missing or invalid.
pub fn is_a_terragrunt_module(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let not_a_module = || ValidationError::NotATerragruntModule {
        path: path.to_path_buf(),
    };

    is_valid_dir(path).map_err(|_| not_a_module())?;
    is_a_hcl_file(path.join(TERRAGRUNT_CONFIG)).map_err(|_| not_a_module())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_terragrunt_module() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        assert!(is_a_terragrunt_module(temp.path()).is_err());

        std::fs::write(temp.path().join(TERRAGRUNT_CONFIG), "terraform {\n  source = \"../module\"\n}\n")
            .expect("write failed");
        assert!(is_a_terragrunt_module(temp.path()).is_ok());
    }

    #[test]
    fn test_missing_directory_is_not_a_module() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = is_a_terragrunt_module(temp.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("not a valid terragrunt module"));
    }
}
