//! Validation of scenario configuration files.
//!
//! Checks run on the document alone. Filesystem checks on the module and
//! variable files happen when the scenario is created.

use regex::Regex;
use tracing::debug;

use crate::error::{ConfigError, Result};

use super::spec::ScenarioConfig;

/// Validator for scenario configurations.
#[derive(Debug, Default)]
pub struct ConfigValidator;

/// Validation result containing all problems found.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Fatal problems.
    pub errors: Vec<FieldError>,
    /// Non-fatal issues.
    pub warnings: Vec<String>,
}

/// A single validation error.
#[derive(Debug)]
pub struct FieldError {
    /// The field path that failed validation.
    pub field: String,
    /// The error message.
    pub message: String,
}

impl ValidationResult {
    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }
}

impl ConfigValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validates a scenario configuration.
    ///
    /// # Errors
    ///
    /// Returns the first error found. Warnings are returned in the result.
    pub fn validate(&self, config: &ScenarioConfig) -> Result<ValidationResult> {
        let mut result = ValidationResult::default();

        Self::validate_paths(config, &mut result);
        Self::validate_vars(config, &mut result);
        Self::validate_env(config, &mut result);
        Self::validate_retry(config, &mut result);

        if let Some(first_error) = result.errors.first() {
            return Err(ConfigError::validation(
                first_error.message.clone(),
                first_error.field.clone(),
            )
            .into());
        }

        for warning in &result.warnings {
            debug!("Configuration warning: {warning}");
        }
        debug!("Configuration validation passed");
        Ok(result)
    }

    fn validate_paths(config: &ScenarioConfig, result: &mut ValidationResult) {
        if config.workdir.as_os_str().is_empty() {
            result.error("workdir", "Module directory cannot be empty");
        }

        if config
            .plan_file
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            result.error("plan_file", "Plan file cannot be empty");
        }

        if config.parallel && config.plan_file.as_ref().is_some_and(|p| p.is_absolute()) {
            result.warnings.push(String::from(
                "plan_file: an absolute plan file is shared between parallel runs",
            ));
        }

        if config
            .fixtures_dir
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            result.error("fixtures_dir", "Fixtures directory cannot be empty");
        }

        for (i, file) in config.var_files.iter().enumerate() {
            if !file.ends_with(".tfvars") {
                result.error(
                    format!("var_files[{i}]"),
                    format!("Variable file '{file}' must have a .tfvars extension"),
                );
            }
        }

        if config.timeout_secs == Some(0) {
            result.error("timeout_secs", "Timeout must be at least 1 second");
        }
    }

    fn validate_vars(config: &ScenarioConfig, result: &mut ValidationResult) {
        for name in config.vars.keys() {
            if name.trim().is_empty() {
                result.error("vars", "Variable names cannot be empty");
            }
        }
    }

    fn validate_env(config: &ScenarioConfig, result: &mut ValidationResult) {
        for name in config.env.keys() {
            if name.is_empty() || name.contains('=') {
                result.error(
                    format!("env.{name}"),
                    format!("Invalid environment variable name '{name}'"),
                );
            }
        }
    }

    fn validate_retry(config: &ScenarioConfig, result: &mut ValidationResult) {
        let Some(retry) = &config.retry else {
            return;
        };

        if retry.retryable_errors.is_empty() {
            result
                .warnings
                .push(String::from("retry.retryable_errors: no pattern, nothing will be retried"));
        }

        for pattern in retry.retryable_errors.keys() {
            if let Err(e) = Regex::new(pattern) {
                result.error(
                    format!("retry.retryable_errors[{pattern}]"),
                    format!("Invalid pattern: {e}"),
                );
            }
        }
    }
}
