//! Filesystem and environment helpers shared by the validation, Git and
//! scenario modules.

mod dirs;
mod env;
mod files;

pub use dirs::{dir_exists_and_has_content, is_valid_dir, list_dir};
pub use env::{EnvVar, clean_value, host_env_vars, host_env_vars_named};
pub use files::{file_has_content, has_extension};
