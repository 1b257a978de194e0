//! Error types for the tftest helpers.
//!
//! This module provides the error hierarchy for every step of a test
//! scenario: directory resolution, module validation, Terraform command
//! execution, plan assertions, and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tftest.
#[derive(Debug, Error)]
pub enum TfTestError {
    /// Directory and Git root resolution errors.
    #[error("Directory error: {0}")]
    Dir(#[from] DirError),

    /// Module, variable file and HCL validation errors.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Terraform command errors.
    #[error("Terraform error: {0}")]
    Terraform(#[from] TerraformError),

    /// Plan assertion failures.
    #[error("Assertion failed: {0}")]
    Assertion(#[from] AssertionError),

    /// Scenario configuration errors.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory and Git root resolution errors.
#[derive(Debug, Error)]
pub enum DirError {
    /// A required path argument was empty.
    #[error("{name} cannot be empty")]
    EmptyPath {
        /// Name of the argument.
        name: &'static str,
    },

    /// The path does not exist.
    #[error("path does not exist: {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The path exists but is not a directory.
    #[error("path is not a directory: {path}")]
    NotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The directory exists but has no entries.
    #[error("directory is empty: {path}")]
    Empty {
        /// The empty directory.
        path: PathBuf,
    },

    /// No `.git` marker was found within the search bound.
    #[error("no git repository found within {levels} levels of directory {path}")]
    RepoNotFound {
        /// Where the search started.
        path: PathBuf,
        /// Number of parent levels inspected.
        levels: usize,
    },

    /// The directory is not itself a Git repository root.
    #[error("directory {path} is not a git repository")]
    NotARepository {
        /// The inspected directory.
        path: PathBuf,
    },

    /// An absolute path lies outside the repository root.
    #[error("the path {path} does not start with the repo root {root}")]
    OutsideRepository {
        /// The offending path.
        path: PathBuf,
        /// The repository root.
        root: PathBuf,
    },

    /// `git rev-parse` failed or is unavailable.
    #[error("git command failed in {path}: {message}")]
    GitCommand {
        /// Directory the command ran in.
        path: PathBuf,
        /// Failure description.
        message: String,
    },

    /// Copying a directory tree failed.
    #[error("failed to copy {from} to {to}: {message}")]
    CopyFailed {
        /// Source path.
        from: PathBuf,
        /// Destination path.
        to: PathBuf,
        /// Failure description.
        message: String,
    },

    /// Any other filesystem access failure.
    #[error("unexpected error when checking {path}: {message}")]
    Access {
        /// The inspected path.
        path: PathBuf,
        /// Failure description.
        message: String,
    },
}

/// Module, variable file and HCL validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The Terraform directory does not exist.
    #[error("the terraform directory does not exist: {path}")]
    TfDirNotFound {
        /// The missing directory.
        path: PathBuf,
    },

    /// The Terraform directory is a file.
    #[error("the terraform directory is not a directory: {path}")]
    TfDirNotADirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// No file with one of the expected extensions was found.
    #[error("no Terraform files with extensions {extensions:?} found in directory: {path}")]
    NoTerraformFiles {
        /// Inspected directory.
        path: PathBuf,
        /// Extensions searched for.
        extensions: Vec<String>,
    },

    /// The variable file does not exist.
    #[error("the terraform variable file does not exist: {path}")]
    VarFileNotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// The variable file is a directory.
    #[error("the terraform variable file is a directory: {path}")]
    VarFileIsDirectory {
        /// The offending path.
        path: PathBuf,
    },

    /// The variable file has the wrong extension.
    #[error("the terraform variable file does not have a .tfvars extension: {path}")]
    VarFileExtension {
        /// The offending path.
        path: PathBuf,
    },

    /// The variable file is empty.
    #[error("the terraform variable file is empty: {path}")]
    VarFileEmpty {
        /// The empty file.
        path: PathBuf,
    },

    /// The fixtures directory contains no `.tfvars` files.
    #[error("the Terraform module {workdir} with this fixtures directory {fixtures_dir} does not have any .tfvars files")]
    NoTfVarsInFixtures {
        /// Module directory.
        workdir: PathBuf,
        /// Fixtures directory, relative to the module.
        fixtures_dir: PathBuf,
    },

    /// An HCL file failed validation.
    #[error("the .hcl file {path} is invalid: {reason}")]
    InvalidHclFile {
        /// The offending path.
        path: PathBuf,
        /// Why it is invalid.
        reason: String,
    },

    /// The directory is not a Terragrunt module.
    #[error("the terragrunt module is not a valid terragrunt module: {path}")]
    NotATerragruntModule {
        /// The inspected directory.
        path: PathBuf,
    },

    /// A required argument was missing.
    #[error("{name} is required")]
    Required {
        /// Name of the argument.
        name: &'static str,
    },
}

/// Terraform command errors.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The binary could not be started.
    #[error("failed to start {binary}: {message}")]
    SpawnFailed {
        /// Binary name.
        binary: String,
        /// Failure description.
        message: String,
    },

    /// The command exited with a non-zero status.
    #[error("{binary} {command} failed (exit code {exit_code:?}): {output}")]
    CommandFailed {
        /// Binary name.
        binary: String,
        /// Subcommand that failed.
        command: String,
        /// Process exit code, if any.
        exit_code: Option<i32>,
        /// Combined stdout and stderr.
        output: String,
    },

    /// The command did not finish in time.
    #[error("{binary} {command} timed out after {timeout_secs}s")]
    Timeout {
        /// Binary name.
        binary: String,
        /// Subcommand that timed out.
        command: String,
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// A retryable failure persisted past the retry budget.
    #[error("{command} still failing after {attempts} attempts: {reason}")]
    MaxRetriesExceeded {
        /// Subcommand that failed.
        command: String,
        /// Number of attempts made.
        attempts: u32,
        /// Description attached to the matched retryable pattern.
        reason: String,
    },

    /// `show -json` output could not be decoded.
    #[error("failed to decode plan JSON: {message}")]
    InvalidPlanJson {
        /// Decoder message.
        message: String,
    },

    /// A retryable error pattern is not a valid regex.
    #[error("invalid retryable error pattern '{pattern}': {message}")]
    InvalidRetryPattern {
        /// The pattern.
        pattern: String,
        /// Regex compiler message.
        message: String,
    },
}

/// Plan assertion failures.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The plan has no changes but some were expected.
    #[error("No changes found in plan")]
    NoChanges,

    /// The plan has changes but none were expected.
    #[error("Changes found: {count} resource(s) planned to change ({addresses})")]
    UnexpectedChanges {
        /// Number of changing resources.
        count: usize,
        /// Comma separated addresses.
        addresses: String,
    },

    /// A change count did not match.
    #[error("Expected and actual {kind} do not match: expected {expected}, actual {actual}")]
    CountMismatch {
        /// What was counted.
        kind: &'static str,
        /// Expected count.
        expected: usize,
        /// Actual count.
        actual: usize,
    },

    /// A resource was not planned with the requested action.
    #[error("Resource {address} was not marked to be {kind} but was expected to")]
    ResourceNotChanged {
        /// Resource address.
        address: String,
        /// Requested change kind.
        kind: String,
    },

    /// A variable is missing from the plan.
    #[error("Variable {name} was not found in the plan")]
    VariableNotFound {
        /// Variable name.
        name: String,
    },

    /// A value does not match the expectation.
    #[error("Variable {name} does not have the expected value: expected {expected}, actual {actual}")]
    ValueMismatch {
        /// Variable name or query.
        name: String,
        /// Expected value.
        expected: String,
        /// Actual value.
        actual: String,
    },

    /// The expected text cannot be read as the actual value's kind.
    #[error("Expected value for variable {name} cannot be read as {kind}: {expected}")]
    InvalidExpected {
        /// Variable name or query.
        name: String,
        /// Kind the text had to parse as.
        kind: &'static str,
        /// The expected text.
        expected: String,
    },

    /// The actual value has a kind that cannot be compared.
    #[error("Variable {name} has an unsupported type: {kind}")]
    UnsupportedType {
        /// Variable name or query.
        name: String,
        /// JSON kind of the value.
        kind: &'static str,
    },

    /// A JSONPath expression could not be parsed.
    #[error("invalid JSONPath query '{query}': {message}")]
    InvalidJsonPath {
        /// The query.
        query: String,
        /// Parser message.
        message: String,
    },

    /// One or more JSONPath cases failed.
    #[error("{} JSONPath case(s) failed:\n{}", .failures.len(), .failures.join("\n"))]
    JsonPathCases {
        /// One line per failed case.
        failures: Vec<String>,
    },
}

/// Scenario configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// The configuration file could not be parsed.
    #[error("Failed to parse configuration: {message}")]
    ParseError {
        /// Description of the parse error.
        message: String,
        /// Optional source location.
        location: Option<String>,
    },

    /// Validation failed.
    #[error("Configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation error.
        message: String,
        /// Field that failed validation.
        field: Option<String>,
    },
}

/// Result type alias for tftest operations.
pub type Result<T> = std::result::Result<T, TfTestError>;

impl TfTestError {
    /// Returns the combined command output, if this error carries one.
    #[must_use]
    pub fn command_output(&self) -> Option<&str> {
        match self {
            Self::Terraform(TerraformError::CommandFailed { output, .. }) => Some(output),
            _ => None,
        }
    }
}

impl DirError {
    /// Creates an access error for a path.
    #[must_use]
    pub fn access(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Access {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl TerraformError {
    /// Creates a plan decoding error.
    #[must_use]
    pub fn invalid_plan(message: impl Into<String>) -> Self {
        Self::InvalidPlanJson {
            message: message.into(),
        }
    }
}

impl AssertionError {
    /// Creates a value mismatch error.
    #[must_use]
    pub fn mismatch(
        name: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::ValueMismatch {
            name: name.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

impl ConfigError {
    /// Creates a validation error for a specific field.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}
