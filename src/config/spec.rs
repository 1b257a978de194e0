//! Scenario configuration file types.
//!
//! These structs map to `tftest.yaml`, which describes one scenario the same
//! way the [`ScenarioOptions`] builder does.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::scenario::ScenarioOptions;
use crate::terraform::Binary;

/// The root of a scenario configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioConfig {
    /// Module directory, relative to the configuration file.
    pub workdir: PathBuf,
    /// Binary used to run the module.
    #[serde(default)]
    pub binary: Binary,
    /// Run on an isolated copy of the repository.
    #[serde(default)]
    pub parallel: bool,
    /// Plan file, relative to the module directory.
    #[serde(default)]
    pub plan_file: Option<PathBuf>,
    /// Per-command timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Terraform variables.
    #[serde(default)]
    pub vars: BTreeMap<String, Value>,
    /// Variable files, relative to the module directory.
    #[serde(default)]
    pub var_files: Vec<String>,
    /// Directory scanned for `.tfvars` files, relative to the module.
    #[serde(default)]
    pub fixtures_dir: Option<PathBuf>,
    /// Environment variables for every command.
    #[serde(default)]
    pub env: HashMap<String, String>,
    /// Pass the host environment to every command.
    #[serde(default)]
    pub host_env: bool,
    /// Retry settings replacing the defaults.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

/// Retry settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetryConfig {
    /// Regex pattern to description.
    #[serde(default)]
    pub retryable_errors: BTreeMap<String, String>,
    /// Extra attempts after the first failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay between attempts, in seconds.
    #[serde(default = "default_time_between_retries_secs")]
    pub time_between_retries_secs: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_time_between_retries_secs() -> u64 {
    5
}

impl ScenarioConfig {
    /// Creates a configuration for a module directory.
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            binary: Binary::default(),
            parallel: false,
            plan_file: None,
            timeout_secs: None,
            vars: BTreeMap::new(),
            var_files: Vec::new(),
            fixtures_dir: None,
            env: HashMap::new(),
            host_env: false,
            retry: None,
        }
    }

    /// Resolves the module directory against the directory holding the
    /// configuration file.
    #[must_use]
    pub fn resolve_workdir(&self, base: Option<&Path>) -> PathBuf {
        match base {
            Some(base) if self.workdir.is_relative() => base.join(&self.workdir),
            _ => self.workdir.clone(),
        }
    }

    /// Converts the configuration into builder options for the module at
    /// `workdir`.
    #[must_use]
    pub fn to_options(&self, workdir: &Path) -> ScenarioOptions {
        let mut options = ScenarioOptions::new()
            .with_binary(self.binary)
            .with_vars(self.vars.clone())
            .with_env_vars(self.env.clone());

        if !self.var_files.is_empty() {
            options = options.with_var_files(workdir, self.var_files.clone());
        }
        if let Some(fixtures_dir) = &self.fixtures_dir {
            options = options.with_scanned_tfvars(workdir, fixtures_dir.clone());
        }
        if let Some(plan_file) = &self.plan_file {
            options = options.with_plan_file(plan_file.clone());
        }
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if let Some(retry) = &self.retry {
            options = options.with_retry(
                retry.retryable_errors.clone(),
                Duration::from_secs(retry.time_between_retries_secs),
                retry.max_retries,
            );
        }
        if self.parallel {
            options = options.with_parallel();
        }
        if self.host_env {
            options = options.with_host_env();
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_workdir() {
        let config = ScenarioConfig::new("modules/random");
        assert_eq!(
            config.resolve_workdir(Some(Path::new("/repo/tests"))),
            PathBuf::from("/repo/tests/modules/random")
        );
        assert_eq!(config.resolve_workdir(None), PathBuf::from("modules/random"));

        let absolute = ScenarioConfig::new("/abs/module");
        assert_eq!(
            absolute.resolve_workdir(Some(Path::new("/repo"))),
            PathBuf::from("/abs/module")
        );
    }

    #[test]
    fn test_to_options() {
        let mut config = ScenarioConfig::new("module");
        config.parallel = true;
        config.timeout_secs = Some(30);
        config.vars.insert(String::from("a"), Value::from(1));

        let options = config.to_options(Path::new("module"));
        assert!(options.is_parallel());
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
        assert_eq!(options.vars["a"], Value::from(1));
    }
}
