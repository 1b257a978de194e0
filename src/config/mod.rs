//! Scenario configuration files.
//!
//! This module handles:
//! - Parsing `tftest.yaml` into a [`ScenarioConfig`]
//! - `TFTEST_*` environment overrides and `.env` loading
//! - Validation of the document before it becomes builder options

mod parser;
mod spec;
mod validator;

pub use parser::{
    ConfigParser, DEFAULT_CONFIG_FILES, ENV_BINARY, ENV_PARALLEL, ENV_PLAN_FILE, ENV_TIMEOUT_SECS,
    find_config_file,
};
pub use spec::{RetryConfig, ScenarioConfig};
pub use validator::{ConfigValidator, FieldError, ValidationResult};
