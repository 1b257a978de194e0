//! Options passed to every Terraform invocation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::host_env_vars;

/// The binary used to run a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binary {
    /// `terraform`.
    #[default]
    Terraform,
    /// `terragrunt`, which wraps Terraform.
    Terragrunt,
    /// `tofu` (`OpenTofu`).
    Tofu,
}

impl Binary {
    /// Returns the executable name.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::Terraform => "terraform",
            Self::Terragrunt => "terragrunt",
            Self::Tofu => "tofu",
        }
    }
}

impl std::fmt::Display for Binary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}

/// Everything needed to run a Terraform command against one module.
#[derive(Debug, Clone, Default)]
pub struct TerraformOptions {
    /// Directory holding the module.
    pub terraform_dir: PathBuf,
    /// Binary to invoke.
    pub binary: Binary,
    /// Input variables, passed as `-var` flags.
    pub vars: BTreeMap<String, Value>,
    /// Variable files, passed as `-var-file` flags, relative to the module.
    pub var_files: Vec<String>,
    /// Extra environment for the process.
    pub env_vars: HashMap<String, String>,
    /// Appends `-no-color`.
    pub no_color: bool,
    /// Plan file written by `plan -out` and read by `show -json`.
    pub plan_file_path: Option<PathBuf>,
    /// Output regex to description, for failures worth retrying.
    pub retryable_errors: BTreeMap<String, String>,
    /// Delay between retries.
    pub time_between_retries: Duration,
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Per-command timeout.
    pub timeout: Option<Duration>,
}

impl TerraformOptions {
    /// Creates options for the given module directory.
    #[must_use]
    pub fn new(terraform_dir: impl Into<PathBuf>) -> Self {
        Self {
            terraform_dir: terraform_dir.into(),
            no_color: true,
            ..Self::default()
        }
    }

    /// Replaces all variables.
    #[must_use]
    pub fn override_vars(mut self, vars: BTreeMap<String, Value>) -> Self {
        self.vars = vars;
        self
    }

    /// Adds variables, overwriting existing keys.
    #[must_use]
    pub fn add_vars<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.vars
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Appends variable files.
    #[must_use]
    pub fn add_var_files<S: Into<String>>(mut self, files: impl IntoIterator<Item = S>) -> Self {
        self.var_files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Replaces all variable files.
    #[must_use]
    pub fn override_var_files<S: Into<String>>(
        mut self,
        files: impl IntoIterator<Item = S>,
    ) -> Self {
        self.var_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Adds environment variables, overwriting existing keys.
    #[must_use]
    pub fn add_env_vars<K, V>(mut self, env: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Adds every host environment variable.
    #[must_use]
    pub fn add_env_vars_from_host(self) -> Self {
        self.add_env_vars(host_env_vars())
    }

    /// Installs the default retryable error table and retry budget.
    #[must_use]
    pub fn with_default_retryable_errors(mut self) -> Self {
        self.retryable_errors
            .extend(super::retry::default_retryable_errors());
        self.max_retries = super::retry::DEFAULT_MAX_RETRIES;
        self.time_between_retries = super::retry::DEFAULT_TIME_BETWEEN_RETRIES;
        self
    }
}
