//! Terraform module and variable file checks.

use std::path::Path;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::utils::{dir_exists_and_has_content, file_has_content, has_extension, list_dir};

/// Extensions that mark a directory as a Terraform module.
pub const TERRAFORM_EXTENSIONS: &[&str] = &[".tf"];

/// Checks that the path exists and is a directory.
///
/// # Errors
///
/// Returns an error if the directory is missing or is a file.
pub fn is_valid_tf_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ValidationError::TfDirNotADirectory {
            path: path.to_path_buf(),
        }
        .into()),
        Err(_) => Err(ValidationError::TfDirNotFound {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

/// Checks that the directory directly contains a file with one of the given
/// extensions.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or has no such file.
pub fn has_terraform_files(path: impl AsRef<Path>, extensions: &[&str]) -> Result<()> {
    let path = path.as_ref();

    let found = list_dir(path)?
        .iter()
        .any(|file| file.is_file() && extensions.iter().any(|ext| has_extension(file, ext)));

    if found {
        Ok(())
    } else {
        Err(ValidationError::NoTerraformFiles {
            path: path.to_path_buf(),
            extensions: extensions.iter().map(|e| (*e).to_string()).collect(),
        }
        .into())
    }
}

/// Checks that the path is a non-empty `.tfvars` file.
///
/// # Errors
///
/// Returns an error if the file is missing, is a directory, has another
/// extension, or is empty.
pub fn is_valid_tfvar_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let owned = || path.to_path_buf();

    let Ok(meta) = std::fs::metadata(path) else {
        return Err(ValidationError::VarFileNotFound { path: owned() }.into());
    };

    if meta.is_dir() {
        return Err(ValidationError::VarFileIsDirectory { path: owned() }.into());
    }

    if !has_extension(path, ".tfvars") {
        return Err(ValidationError::VarFileExtension { path: owned() }.into());
    }

    if meta.len() == 0 {
        return Err(ValidationError::VarFileEmpty { path: owned() }.into());
    }

    debug!("Variable file is valid: {}", path.display());
    Ok(())
}

/// Checks that the path is a non-empty directory holding at least one `.tf`
/// file.
///
/// # Errors
///
/// Returns an error if any check fails.
pub fn is_valid_tf_module_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    is_valid_tf_dir(path)?;
    dir_exists_and_has_content(path)?;
    has_terraform_files(path, TERRAFORM_EXTENSIONS)
}

/// Returns true if the directory directly contains at least one `.tfvars`
/// file.
///
/// # Errors
///
/// Returns an error if the path is empty or cannot be listed.
pub fn has_tfvar_files(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ValidationError::Required { name: "path" }.into());
    }

    Ok(list_dir(path)?
        .iter()
        .any(|file| file.is_file() && has_extension(file, ".tfvars")))
}

/// Checks that the path is a non-empty `.hcl` file.
///
/// # Errors
///
/// Returns an error describing the first failed check.
pub fn is_a_hcl_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let invalid = |reason: &str| -> crate::error::TfTestError {
        ValidationError::InvalidHclFile {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
        .into()
    };

    let Ok(meta) = std::fs::metadata(path) else {
        return Err(invalid("the file does not exist"));
    };

    if meta.is_dir() {
        return Err(invalid("the file is a directory"));
    }

    if !has_extension(path, ".hcl") {
        return Err(invalid("the file does not have a .hcl extension"));
    }

    if !file_has_content(path)? {
        return Err(invalid("the file is empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfTestError;
    use tempfile::TempDir;

    fn module_dir() -> TempDir {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join("main.tf"), "resource \"random_id\" \"this\" {}\n")
            .expect("Failed to write main.tf");
        temp
    }

    #[test]
    fn test_valid_module_dir() {
        let temp = module_dir();
        assert!(is_valid_tf_module_dir(temp.path()).is_ok());
    }

    #[test]
    fn test_module_dir_without_tf_files() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(temp.path().join("README.md"), "docs").expect("Failed to write file");

        let err = is_valid_tf_module_dir(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            TfTestError::Validation(ValidationError::NoTerraformFiles { .. })
        ));
    }

    #[test]
    fn test_missing_tf_dir() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let err = is_valid_tf_dir(temp.path().join("nope")).unwrap_err();
        assert!(err.to_string().contains("the terraform directory does not exist"));
    }

    #[test]
    fn test_tfvar_file_checks() {
        let temp = module_dir();
        let good = temp.path().join("good.tfvars");
        let empty = temp.path().join("empty.tfvars");
        let wrong = temp.path().join("vars.txt");
        std::fs::write(&good, "random_length_password = 25\n").expect("write failed");
        std::fs::write(&empty, "").expect("write failed");
        std::fs::write(&wrong, "a = 1\n").expect("write failed");

        assert!(is_valid_tfvar_file(&good).is_ok());
        assert!(matches!(
            is_valid_tfvar_file(&empty),
            Err(TfTestError::Validation(ValidationError::VarFileEmpty { .. }))
        ));
        assert!(matches!(
            is_valid_tfvar_file(&wrong),
            Err(TfTestError::Validation(ValidationError::VarFileExtension { .. }))
        ));
        assert!(matches!(
            is_valid_tfvar_file(temp.path()),
            Err(TfTestError::Validation(ValidationError::VarFileIsDirectory { .. }))
        ));

        let missing = temp.path().join("i-do-not-exist.tfvars");
        let err = is_valid_tfvar_file(&missing).unwrap_err();
        assert!(err.to_string().contains(&format!(
            "the terraform variable file does not exist: {}",
            missing.display()
        )));
    }

    #[test]
    fn test_has_tfvar_files() {
        let temp = module_dir();
        assert!(!has_tfvar_files(temp.path()).expect("scan failed"));

        std::fs::write(temp.path().join("a.tfvars"), "a = 1\n").expect("write failed");
        assert!(has_tfvar_files(temp.path()).expect("scan failed"));

        assert!(has_tfvar_files("").is_err());
    }

    #[test]
    fn test_hcl_file_checks() {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let hcl = temp.path().join("terragrunt.hcl");
        let empty = temp.path().join("empty.hcl");
        std::fs::write(&hcl, "terraform {}\n").expect("write failed");
        std::fs::write(&empty, "").expect("write failed");

        assert!(is_a_hcl_file(&hcl).is_ok());
        assert!(is_a_hcl_file(&empty).unwrap_err().to_string().contains("empty"));
        assert!(is_a_hcl_file(temp.path().join("none.hcl")).is_err());
    }
}
