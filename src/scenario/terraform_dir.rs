//! Module directory resolution for a scenario.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::terraform::Binary;
use crate::validation::{is_a_terragrunt_module, is_valid_tf_dir, is_valid_tf_module_dir};

use super::parallel::{IsolatedCopy, copy_module_to_temp};

/// Validates `workdir` for `binary` and, when `parallel` is set, copies its
/// repository into a temporary directory.
///
/// Returns the directory commands should run in and the copy that owns it,
/// if any.
///
/// # Errors
///
/// Returns an error if the module is invalid or the copy fails.
pub fn terraform_dir(
    workdir: impl AsRef<Path>,
    binary: Binary,
    parallel: bool,
) -> Result<(PathBuf, Option<IsolatedCopy>)> {
    let workdir = workdir.as_ref();
    is_valid_tf_dir(workdir)?;

    match binary {
        Binary::Terragrunt => is_a_terragrunt_module(workdir)?,
        Binary::Terraform | Binary::Tofu => is_valid_tf_module_dir(workdir)?,
    }

    if !parallel {
        debug!("Using module directory {} in place", workdir.display());
        return Ok((workdir.to_path_buf(), None));
    }

    let copy = copy_module_to_temp(workdir)?;
    Ok((copy.module_dir().to_path_buf(), Some(copy)))
}
