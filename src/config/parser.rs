//! Loading scenario configuration files.
//!
//! Configuration comes from a YAML file, optionally overridden by `TFTEST_*`
//! environment variables.

use crate::error::{ConfigError, Result, TfTestError};
use crate::terraform::Binary;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::spec::ScenarioConfig;

/// Environment variable overriding the binary.
pub const ENV_BINARY: &str = "TFTEST_BINARY";
/// Environment variable overriding parallel mode.
pub const ENV_PARALLEL: &str = "TFTEST_PARALLEL";
/// Environment variable overriding the plan file.
pub const ENV_PLAN_FILE: &str = "TFTEST_PLAN_FILE";
/// Environment variable overriding the command timeout.
pub const ENV_TIMEOUT_SECS: &str = "TFTEST_TIMEOUT_SECS";

/// Parser for scenario configuration files.
#[derive(Debug, Default)]
pub struct ConfigParser {
    /// Base path for the `.env` file.
    base_path: Option<PathBuf>,
}

impl ConfigParser {
    /// Creates a new configuration parser.
    #[must_use]
    pub const fn new() -> Self {
        Self { base_path: None }
    }

    /// Sets the directory searched for `.env`.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<ScenarioConfig> {
        let path = path.as_ref();
        info!("Loading scenario configuration from: {}", path.display());

        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            message: format!("Failed to read file: {e}"),
            location: Some(path.display().to_string()),
        })?;

        self.parse_yaml(&content, Some(path))
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn parse_yaml(&self, content: &str, source: Option<&Path>) -> Result<ScenarioConfig> {
        debug!("Parsing YAML configuration");

        let config: ScenarioConfig = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: format!("YAML parse error: {e}"),
            location: source.map(|p| p.display().to_string()),
        })?;

        debug!("Parsed scenario for module: {}", config.workdir.display());
        Ok(config)
    }

    /// Loads configuration and applies `TFTEST_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or an override has an
    /// invalid value.
    pub fn load_with_env(&self, path: impl AsRef<Path>) -> Result<ScenarioConfig> {
        let mut config = self.load_file(path)?;
        apply_overrides(&mut config, |name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Loads the `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn load_dotenv(&self) -> Result<()> {
        let env_path = self
            .base_path
            .as_ref()
            .map_or_else(|| PathBuf::from(".env"), |p| p.join(".env"));

        if env_path.exists() {
            info!("Loading environment from: {}", env_path.display());
            dotenvy::from_path(&env_path).map_err(|e| ConfigError::ParseError {
                message: format!("Failed to load .env file: {e}"),
                location: Some(env_path.display().to_string()),
            })?;
        } else {
            debug!(".env file not found at: {}", env_path.display());
        }

        Ok(())
    }
}

/// Applies overrides read through `lookup`.
pub(crate) fn apply_overrides(
    config: &mut ScenarioConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let invalid = |name: &str, value: &str| -> TfTestError {
        ConfigError::ParseError {
            message: format!("invalid value '{value}' for {name}"),
            location: Some(name.to_string()),
        }
        .into()
    };

    if let Some(binary) = lookup(ENV_BINARY) {
        debug!("Overriding binary from environment");
        config.binary = match binary.trim().to_ascii_lowercase().as_str() {
            "terraform" => Binary::Terraform,
            "terragrunt" => Binary::Terragrunt,
            "tofu" | "opentofu" => Binary::Tofu,
            _ => return Err(invalid(ENV_BINARY, &binary)),
        };
    }

    if let Some(parallel) = lookup(ENV_PARALLEL) {
        debug!("Overriding parallel from environment");
        config.parallel = match parallel.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => return Err(invalid(ENV_PARALLEL, &parallel)),
        };
    }

    if let Some(plan_file) = lookup(ENV_PLAN_FILE) {
        debug!("Overriding plan_file from environment");
        config.plan_file = Some(PathBuf::from(plan_file));
    }

    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        debug!("Overriding timeout_secs from environment");
        let secs = timeout
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid(ENV_TIMEOUT_SECS, &timeout))?;
        config.timeout_secs = Some(secs);
    }

    Ok(())
}

/// Configuration file names searched for.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["tftest.yaml", "tftest.yml"];

/// Finds a configuration file in `start_dir` or its parents.
///
/// # Errors
///
/// Returns an error if no configuration file is found.
pub fn find_config_file(start_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let start = start_dir.as_ref();
    let mut current = start.to_path_buf();

    loop {
        for filename in DEFAULT_CONFIG_FILES {
            let config_path = current.join(filename);
            if config_path.exists() {
                info!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    Err(ConfigError::FileNotFound {
        path: start.join(DEFAULT_CONFIG_FILES[0]),
    }
    .into())
}
