//! Scenarios: a module directory plus everything needed to test it.
//!
//! A [`Scenario`] validates the module, resolves its options from a
//! [`ScenarioOptions`] builder or a configuration file, optionally copies the
//! repository to an isolated directory, and exposes a [`StageClient`].

mod client;
mod options;
mod parallel;
mod stage;
mod terraform_dir;

pub use client::Scenario;
pub use options::{RetryOptions, ScenarioOptions};
pub use parallel::{IsolatedCopy, copy_module_to_temp};
pub use stage::{Stage, StageClient};
pub use terraform_dir::terraform_dir;
