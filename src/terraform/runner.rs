//! Process execution seam.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, TerraformError};

use super::options::TerraformOptions;

/// Runs one Terraform invocation and returns its combined output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TerraformRunner: Send + Sync {
    /// Runs the binary selected by `options` with `args` in the module
    /// directory.
    ///
    /// Returns stdout on success. A non-zero exit maps to
    /// [`TerraformError::CommandFailed`] carrying stdout and stderr.
    async fn run(&self, options: &TerraformOptions, args: &[String]) -> Result<String>;
}

/// Runner that spawns the real binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner;

impl CommandRunner {
    /// Creates a new process runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TerraformRunner for CommandRunner {
    async fn run(&self, options: &TerraformOptions, args: &[String]) -> Result<String> {
        let binary = options.binary.command();
        let subcommand = args.first().cloned().unwrap_or_default();

        info!(
            "Running command {binary} with args {:?} in {}",
            args,
            options.terraform_dir.display()
        );

        let child = Command::new(binary)
            .args(args)
            .current_dir(&options.terraform_dir)
            .envs(&options.env_vars)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TerraformError::SpawnFailed {
                binary: binary.to_string(),
                message: e.to_string(),
            })?;

        let output = match options.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| TerraformError::Timeout {
                    binary: binary.to_string(),
                    command: subcommand.clone(),
                    timeout_secs: limit.as_secs(),
                })??,
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!("{binary} {subcommand} exited with {}", output.status);

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(TerraformError::CommandFailed {
                binary: binary.to_string(),
                command: subcommand,
                exit_code: output.status.code(),
                output: format!("{stdout}{stderr}"),
            }
            .into())
        }
    }
}
