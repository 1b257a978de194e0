//! Logging setup for tests.
//!
//! Stages and commands log through `tracing`. Call [`init`] at the start of a
//! test to see those logs. It is safe to call from every test.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `TFTEST_LOG=tftest=debug`.
pub const LOG_ENV: &str = "TFTEST_LOG";

/// Installs a global subscriber writing to the test output.
///
/// `TFTEST_LOG` takes precedence; otherwise the level is `debug` when
/// `verbose` is set and `info` when it is not. Does nothing if a subscriber
/// is already installed.
pub fn init(verbose: bool) {
    let _ = try_init(verbose);
}

/// Like [`init`], returning false if a subscriber was already installed.
pub fn try_init(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_test_writer()
        .try_init()
        .is_ok()
}

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init(true);
        assert!(!try_init(false));
    }
}
