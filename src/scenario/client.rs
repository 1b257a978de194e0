//! A module under test, ready to run stages.

use std::path::Path;
use tracing::{debug, info};

use crate::config::{ConfigParser, ConfigValidator};
use crate::error::{DirError, Result};
use crate::terraform::{CommandRunner, TerraformOptions, TerraformRunner};

use super::options::ScenarioOptions;
use super::parallel::IsolatedCopy;
use super::stage::StageClient;
use super::terraform_dir::terraform_dir;

/// A validated module directory, its Terraform options and a stage client.
///
/// When built with [`ScenarioOptions::with_parallel`], the scenario owns a
/// temporary copy of the repository that is removed when it is dropped.
#[derive(Debug)]
pub struct Scenario<R = CommandRunner> {
    options: TerraformOptions,
    stages: StageClient<R>,
    workspace: Option<IsolatedCopy>,
}

impl Scenario<CommandRunner> {
    /// Creates a scenario for `workdir` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if `workdir` is not a Terraform module.
    pub fn new(workdir: impl AsRef<Path>) -> Result<Self> {
        Self::with_runner(workdir, ScenarioOptions::default(), CommandRunner::new())
    }

    /// Creates a scenario for `workdir` with the given options.
    ///
    /// # Errors
    ///
    /// Returns the first failing option check, or an error if `workdir` is
    /// not a valid module.
    pub fn new_with_options(workdir: impl AsRef<Path>, options: ScenarioOptions) -> Result<Self> {
        Self::with_runner(workdir, options, CommandRunner::new())
    }

    /// Creates a scenario from a `tftest.yaml` file.
    ///
    /// A `.env` next to the file is loaded first, then `TFTEST_*` overrides
    /// are applied. The module directory is relative to the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or is invalid, or if
    /// the scenario cannot be created.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let base = path.parent().filter(|p| !p.as_os_str().is_empty());

        let parser = base.map_or_else(ConfigParser::new, |b| ConfigParser::new().with_base_path(b));
        parser.load_dotenv()?;
        let config = parser.load_with_env(path)?;

        let result = ConfigValidator::new().validate(&config)?;
        for warning in &result.warnings {
            info!("{warning}");
        }

        let workdir = config.resolve_workdir(base);
        let options = config.to_options(&workdir);
        Self::new_with_options(workdir, options)
    }
}

impl<R: TerraformRunner> Scenario<R> {
    /// Creates a scenario that runs commands through `runner`.
    ///
    /// # Errors
    ///
    /// Returns the first failing option check, or an error if `workdir` is
    /// not a valid module or cannot be copied.
    pub fn with_runner(
        workdir: impl AsRef<Path>,
        scenario_options: ScenarioOptions,
        runner: R,
    ) -> Result<Self> {
        let workdir = workdir.as_ref();
        let var_files = scenario_options.resolve_var_files()?;

        let (tf_dir, workspace) =
            terraform_dir(workdir, scenario_options.binary, scenario_options.parallel)?;
        // Commands run inside tf_dir, so paths handed to them must not be relative.
        let tf_dir = std::path::absolute(&tf_dir)
            .map_err(|e| DirError::access(&tf_dir, e.to_string()))?;

        let mut options = TerraformOptions::new(&tf_dir).with_default_retryable_errors();
        options.binary = scenario_options.binary;
        options.timeout = scenario_options.timeout;

        if let Some(plan_file) = &scenario_options.plan_file {
            options.plan_file_path = Some(tf_dir.join(plan_file));
        }

        if !scenario_options.vars.is_empty() {
            debug!("Setting Terraform variables: {:?}", scenario_options.vars);
            options = options.override_vars(scenario_options.vars);
        }

        if !var_files.is_empty() {
            debug!("Setting Terraform variable files: {var_files:?}");
            options = options.override_var_files(var_files);
        }

        if scenario_options.host_env {
            options = options.add_env_vars_from_host();
        }
        options = options.add_env_vars(scenario_options.env_vars);

        if let Some(retry) = scenario_options.retry {
            options.retryable_errors = retry.retryable_errors;
            options.time_between_retries = retry.time_between_retries;
            options.max_retries = retry.max_retries;
        }

        info!(
            "Scenario ready for {} ({})",
            options.terraform_dir.display(),
            options.binary
        );

        Ok(Self {
            options,
            stages: StageClient::new(runner),
            workspace,
        })
    }

    /// The options every stage should be called with.
    #[must_use]
    pub const fn terraform_options(&self) -> &TerraformOptions {
        &self.options
    }

    /// Mutable access to the options, for per-test tweaks.
    pub const fn terraform_options_mut(&mut self) -> &mut TerraformOptions {
        &mut self.options
    }

    /// The stage client.
    #[must_use]
    pub const fn stages(&self) -> &StageClient<R> {
        &self.stages
    }

    /// Directory commands run in.
    #[must_use]
    pub fn terraform_dir(&self) -> &Path {
        &self.options.terraform_dir
    }

    /// Returns true if the scenario runs on an isolated copy.
    #[must_use]
    pub const fn is_isolated(&self) -> bool {
        self.workspace.is_some()
    }
}
