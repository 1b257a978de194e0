//! Terraform subcommands with retry handling.

use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::{Result, TerraformError, TfTestError, ValidationError};
use crate::plan::PlanOutput;

use super::args::{apply_args, destroy_args, init_args, plan_args, show_args};
use super::options::TerraformOptions;
use super::retry::RetryPolicy;
use super::runner::{CommandRunner, TerraformRunner};

/// Runs Terraform subcommands through a [`TerraformRunner`].
#[derive(Debug, Clone, Default)]
pub struct Terraform<R = CommandRunner> {
    runner: R,
}

impl Terraform<CommandRunner> {
    /// Creates a client that spawns the real binary.
    #[must_use]
    pub const fn with_command_runner() -> Self {
        Self {
            runner: CommandRunner::new(),
        }
    }
}

impl<R: TerraformRunner> Terraform<R> {
    /// Creates a client around a runner.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Returns the underlying runner.
    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// Runs `args`, retrying failures that match a retryable pattern.
    ///
    /// # Errors
    ///
    /// Returns the first non-retryable failure, or
    /// [`TerraformError::MaxRetriesExceeded`] once the retry budget is spent.
    pub async fn run_with_retry(&self, options: &TerraformOptions, args: &[String]) -> Result<String> {
        let policy = RetryPolicy::from_options(options)?;
        let command = args.first().cloned().unwrap_or_default();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let err = match self.runner.run(options, args).await {
                Ok(output) => return Ok(output),
                Err(err) => err,
            };

            let Some(reason) = err.command_output().and_then(|out| policy.matching(out)) else {
                return Err(err);
            };

            if attempt > policy.max_retries {
                return Err(TerraformError::MaxRetriesExceeded {
                    command,
                    attempts: attempt,
                    reason: reason.to_string(),
                }
                .into());
            }

            warn!(
                "{command} returned an error: {reason}. Sleeping for {:?} and will try again.",
                policy.time_between_retries
            );
            tokio::time::sleep(policy.time_between_retries).await;
        }
    }

    /// Runs `init`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn init(&self, options: &TerraformOptions) -> Result<String> {
        self.run_with_retry(options, &init_args(options)).await
    }

    /// Runs `plan`, writing the plan file when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn plan(&self, options: &TerraformOptions) -> Result<String> {
        self.run_with_retry(options, &plan_args(options)).await
    }

    /// Runs `apply -auto-approve`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn apply(&self, options: &TerraformOptions) -> Result<String> {
        self.run_with_retry(options, &apply_args(options)).await
    }

    /// Runs `destroy -auto-approve`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn destroy(&self, options: &TerraformOptions) -> Result<String> {
        info!("Destroying {}", options.terraform_dir.display());
        self.run_with_retry(options, &destroy_args(options)).await
    }

    /// Runs `show -json` on the configured plan file.
    ///
    /// # Errors
    ///
    /// Returns an error if no plan file is configured or the command fails.
    pub async fn show_json(&self, options: &TerraformOptions) -> Result<String> {
        let plan_file = required_plan_file(options)?;
        self.run_with_retry(options, &show_args(options, &plan_file)).await
    }

    /// Runs `init` then `plan`.
    ///
    /// # Errors
    ///
    /// Returns an error if either command fails.
    pub async fn init_and_plan(&self, options: &TerraformOptions) -> Result<String> {
        self.init(options).await?;
        self.plan(options).await
    }

    /// Runs `init` then `apply`.
    ///
    /// # Errors
    ///
    /// Returns an error if either command fails.
    pub async fn init_and_apply(&self, options: &TerraformOptions) -> Result<String> {
        self.init(options).await?;
        self.apply(options).await
    }

    /// Runs `init`, `plan -out` and `show -json`, returning the raw JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if no plan file is configured or any command fails.
    pub async fn init_and_plan_and_show(&self, options: &TerraformOptions) -> Result<String> {
        required_plan_file(options)?;
        self.init_and_plan(options).await?;
        self.show_json(options).await
    }

    /// Like [`Self::init_and_plan_and_show`], decoding the plan.
    ///
    /// # Errors
    ///
    /// Returns an error if any command fails or the JSON cannot be decoded.
    pub async fn init_and_plan_and_show_with_struct(
        &self,
        options: &TerraformOptions,
    ) -> Result<PlanOutput> {
        let raw = self.init_and_plan_and_show(options).await?;
        PlanOutput::parse(&raw)
    }
}

fn required_plan_file(options: &TerraformOptions) -> Result<PathBuf> {
    options.plan_file_path.clone().ok_or_else(|| {
        TfTestError::from(ValidationError::Required {
            name: "plan_file_path",
        })
    })
}
