// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![warn(missing_docs)]                // All public items must be documented
#![warn(dead_code)]                   // Unused code is flagged
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// Tests assert with unwrap/expect freely
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tftest
//!
//! Helpers for testing Terraform, `OpenTofu` and Terragrunt modules from Rust
//! tests.
//!
//! ## Overview
//!
//! tftest lets a test:
//!
//! - Validate a module directory and its `.tfvars` fixtures before running
//!   anything
//! - Run `init`, `plan`, `apply` and `destroy` with retries on known
//!   transient errors
//! - Assert on the plan: change counts, per-resource actions, variable
//!   values and arbitrary JSONPath queries
//! - Copy the enclosing Git repository to a temporary directory so that
//!   scenarios can run in parallel
//!
//! ## Modules
//!
//! - [`scenario`]: Scenarios, the options builder and the stage client
//! - [`plan`]: Plan decoding and assertions
//! - [`terraform`]: Command construction, execution and retries
//! - [`git`]: Git repository root resolution
//! - [`validation`]: Module and variable file checks
//! - [`config`]: `tftest.yaml` scenario files
//!
//! ## Example
//!
//! ```no_run
//! use tftest::{Scenario, ScenarioOptions, Stage};
//!
//! # async fn run() -> tftest::Result<()> {
//! tftest::logging::init(false);
//!
//! let options = ScenarioOptions::new()
//!     .with_var("random_length", 10)
//!     .with_parallel();
//! let scenario = Scenario::new_with_options("../modules/random", options)?;
//! let opts = scenario.terraform_options();
//!
//! scenario.stages().plan_stage_with_expected_changes(opts, 1).await?;
//! scenario
//!     .stages()
//!     .plan_with_specific_variable_value_to_expect(opts, "random_length", "10")
//!     .await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod plan;
pub mod scenario;
pub mod terraform;
pub mod tfvars;
pub mod utils;
pub mod validation;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ConfigParser, ConfigValidator, ScenarioConfig, find_config_file};
pub use error::{Result, TfTestError};
pub use git::{RepoLocation, find_repo_root, relative_path_from_repo};
pub use plan::{ChangeKind, ChangeSummary, Comparison, JsonPathCase, PlanOutput};
pub use scenario::{Scenario, ScenarioOptions, Stage, StageClient};
pub use terraform::{Binary, CommandRunner, Terraform, TerraformOptions, TerraformRunner};
