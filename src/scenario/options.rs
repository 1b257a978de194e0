//! Builder for scenario options.
//!
//! Options that touch the filesystem only record their arguments. They are
//! checked, in the order they were given, when the scenario is created.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::terraform::Binary;
use crate::tfvars::tfvars_in_dir;
use crate::validation::{has_tfvar_files, is_valid_tf_dir, is_valid_tfvar_file};

/// Retry settings that replace the default retryable error table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOptions {
    /// Regex pattern to description.
    pub retryable_errors: BTreeMap<String, String>,
    /// Delay between attempts.
    pub time_between_retries: Duration,
    /// Extra attempts after the first failure.
    pub max_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum VarFileSource {
    Listed { workdir: PathBuf, files: Vec<String> },
    Scanned { workdir: PathBuf, fixtures_dir: PathBuf },
}

/// Options for building a [`Scenario`](super::Scenario).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioOptions {
    pub(crate) vars: BTreeMap<String, Value>,
    var_file_sources: Vec<VarFileSource>,
    pub(crate) parallel: bool,
    pub(crate) retry: Option<RetryOptions>,
    pub(crate) env_vars: HashMap<String, String>,
    pub(crate) host_env: bool,
    pub(crate) plan_file: Option<PathBuf>,
    pub(crate) binary: Binary,
    pub(crate) timeout: Option<Duration>,
}

impl ScenarioOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the Terraform variables.
    #[must_use]
    pub fn with_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.vars = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Sets a single Terraform variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Adds variable files, given relative to `workdir`.
    ///
    /// Each file must exist and be a non-empty `.tfvars` file.
    #[must_use]
    pub fn with_var_files<S: Into<String>>(
        mut self,
        workdir: impl Into<PathBuf>,
        files: impl IntoIterator<Item = S>,
    ) -> Self {
        self.var_file_sources.push(VarFileSource::Listed {
            workdir: workdir.into(),
            files: files.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds every `.tfvars` file found under `workdir/fixtures_dir`.
    ///
    /// The fixtures directory must contain at least one `.tfvars` file.
    #[must_use]
    pub fn with_scanned_tfvars(
        mut self,
        workdir: impl Into<PathBuf>,
        fixtures_dir: impl Into<PathBuf>,
    ) -> Self {
        self.var_file_sources.push(VarFileSource::Scanned {
            workdir: workdir.into(),
            fixtures_dir: fixtures_dir.into(),
        });
        self
    }

    /// Sets the plan file, relative to the module directory.
    #[must_use]
    pub fn with_plan_file(mut self, plan_file: impl Into<PathBuf>) -> Self {
        self.plan_file = Some(plan_file.into());
        self
    }

    /// Replaces the retry settings.
    #[must_use]
    pub fn with_retry(
        mut self,
        retryable_errors: BTreeMap<String, String>,
        time_between_retries: Duration,
        max_retries: u32,
    ) -> Self {
        self.retry = Some(RetryOptions {
            retryable_errors,
            time_between_retries,
            max_retries,
        });
        self
    }

    /// Runs the scenario on an isolated copy of the repository.
    #[must_use]
    pub const fn with_parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Adds environment variables for every command.
    #[must_use]
    pub fn with_env_vars<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Passes the host environment to every command.
    ///
    /// Variables set with [`Self::with_env_vars`] take precedence.
    #[must_use]
    pub const fn with_host_env(mut self) -> Self {
        self.host_env = true;
        self
    }

    /// Selects the binary.
    #[must_use]
    pub const fn with_binary(mut self, binary: Binary) -> Self {
        self.binary = binary;
        self
    }

    /// Kills any command that runs longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns true if the scenario runs on an isolated copy.
    #[must_use]
    pub const fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Checks and resolves the variable file options, in order.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns the first failed check.
    pub fn resolve_var_files(&self) -> Result<Vec<String>> {
        let mut resolved: Vec<String> = Vec::new();

        for source in &self.var_file_sources {
            let files = match source {
                VarFileSource::Listed { workdir, files } => listed_var_files(workdir, files)?,
                VarFileSource::Scanned {
                    workdir,
                    fixtures_dir,
                } => scanned_var_files(workdir, fixtures_dir)?,
            };

            for file in files {
                if !resolved.contains(&file) {
                    resolved.push(file);
                }
            }
        }

        Ok(resolved)
    }
}

fn listed_var_files(workdir: &Path, files: &[String]) -> Result<Vec<String>> {
    is_valid_tf_dir(workdir)?;

    for file in files {
        is_valid_tfvar_file(workdir.join(file))?;
    }

    Ok(files.to_vec())
}

fn scanned_var_files(workdir: &Path, fixtures_dir: &Path) -> Result<Vec<String>> {
    is_valid_tf_dir(workdir)?;

    let fixtures_path = workdir.join(fixtures_dir);
    is_valid_tf_dir(&fixtures_path)?;

    if !has_tfvar_files(&fixtures_path)? {
        return Err(ValidationError::NoTfVarsInFixtures {
            workdir: workdir.to_path_buf(),
            fixtures_dir: fixtures_dir.to_path_buf(),
        }
        .into());
    }

    let files: Vec<String> = tfvars_in_dir(&fixtures_path)?
        .into_iter()
        .map(|file| fixtures_dir.join(file).display().to_string())
        .collect();

    debug!("Scanned variable files: {files:?}");
    Ok(files)
}
