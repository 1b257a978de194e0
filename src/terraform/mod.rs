//! Terraform command layer.
//!
//! This module builds the argument lists for `init`, `plan`, `apply`,
//! `destroy` and `show`, runs them through a [`TerraformRunner`], and retries
//! failures whose output matches a known-transient pattern.

mod args;
mod command;
mod options;
mod retry;
mod runner;

pub use args::{format_var_value, format_vars_as_args};
pub use command::Terraform;
pub use options::{Binary, TerraformOptions};
pub use retry::{RetryPolicy, default_retryable_errors};
pub use runner::{CommandRunner, TerraformRunner};

#[cfg(test)]
pub use runner::MockTerraformRunner;
