//! Retryable error patterns.

use regex::Regex;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::{Result, TerraformError};

use super::options::TerraformOptions;

/// Extra attempts installed by [`TerraformOptions::with_default_retryable_errors`].
pub(crate) const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay installed by [`TerraformOptions::with_default_retryable_errors`].
pub(crate) const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Transient failures seen when downloading providers and modules.
const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (
        ".*read: connection reset by peer.*",
        "Failed to reach the provider or module registry.",
    ),
    (
        ".*unable to verify signature.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*unable to verify checksum.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*no provider exists with the given name.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*registry service is unreachable.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*Error installing provider.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*Failed to query available provider packages.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*timeout while waiting for plugin to start.*",
        "Failed to start the provider plugin.",
    ),
    (
        ".*timed out waiting for server handshake.*",
        "Failed to start the provider plugin.",
    ),
    (
        "could not query provider registry for",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*Could not download module.*",
        "Failed to download a module due to transient network error.",
    ),
    (
        ".*net/http: TLS handshake timeout.*",
        "Failed to reach the registry due to a TLS handshake timeout.",
    ),
];

/// Returns the default retryable error table.
#[must_use]
pub fn default_retryable_errors() -> BTreeMap<String, String> {
    DEFAULT_RETRYABLE_ERRORS
        .iter()
        .map(|(pattern, reason)| ((*pattern).to_string(), (*reason).to_string()))
        .collect()
}

/// Compiled retry settings for one command.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    patterns: Vec<(Regex, String)>,
    /// Extra attempts after the first failure.
    pub max_retries: u32,
    /// Delay between attempts.
    pub time_between_retries: Duration,
}

impl RetryPolicy {
    /// Compiles the retry settings carried by `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid regex.
    pub fn from_options(options: &TerraformOptions) -> Result<Self> {
        let patterns = options
            .retryable_errors
            .iter()
            .map(|(pattern, reason)| {
                Regex::new(pattern)
                    .map(|re| (re, reason.clone()))
                    .map_err(|e| TerraformError::InvalidRetryPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            max_retries: options.max_retries,
            time_between_retries: options.time_between_retries,
        })
    }

    /// Returns the description of the first pattern matching `output`.
    #[must_use]
    pub fn matching(&self, output: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(re, _)| re.is_match(output))
            .map(|(_, reason)| reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_compile() {
        let options = TerraformOptions::new("module").with_default_retryable_errors();
        let policy = RetryPolicy::from_options(&options).expect("defaults should compile");

        assert_eq!(policy.max_retries, DEFAULT_MAX_RETRIES);
        assert!(
            policy
                .matching("Error: Failed to query available provider packages\n\nCould not retrieve")
                .is_some()
        );
        assert!(policy.matching("Error: Unsupported argument").is_none());
    }

    #[test]
    fn test_invalid_pattern() {
        let mut options = TerraformOptions::new("module");
        options
            .retryable_errors
            .insert(String::from("(unclosed"), String::from("broken"));

        assert!(RetryPolicy::from_options(&options).is_err());
    }
}
