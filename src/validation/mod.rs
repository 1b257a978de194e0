//! Validation of Terraform and Terragrunt module directories.
//!
//! These checks run before any command is executed so that a broken fixture
//! fails fast with a precise message instead of a Terraform stack trace.

mod terraform;
mod terragrunt;

pub use terraform::{
    TERRAFORM_EXTENSIONS, has_terraform_files, has_tfvar_files, is_a_hcl_file, is_valid_tf_dir,
    is_valid_tf_module_dir, is_valid_tfvar_file,
};
pub use terragrunt::{TERRAGRUNT_CONFIG, is_a_terragrunt_module};
