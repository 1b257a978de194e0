//! Host environment capture.

use std::collections::{HashMap, HashSet};

/// An environment variable captured from the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Cleaned value.
    pub value: String,
}

/// Strips surrounding double quotes and unescapes `\n` and `\t`.
#[must_use]
pub fn clean_value(value: &str) -> String {
    value
        .trim_matches('"')
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

/// Returns every host environment variable, with cleaned values.
///
/// Variables whose name or value is not valid Unicode are skipped.
#[must_use]
pub fn host_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .map(|(k, v)| {
            let cleaned = clean_value(&v);
            (k, cleaned)
        })
        .collect()
}

/// Returns the named host environment variables that are set, in the order
/// the host reports them.
#[must_use]
pub fn host_env_vars_named(names: &[&str]) -> Vec<EnvVar> {
    let wanted: HashSet<&str> = names.iter().copied().collect();

    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .filter(|(k, _)| wanted.contains(k.as_str()))
        .map(|(name, value)| EnvVar {
            value: clean_value(&value),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_value() {
        assert_eq!(clean_value("value"), "value");
        assert_eq!(clean_value("\"value\""), "value");
        assert_eq!(clean_value("\\n"), "\n");
        assert_eq!(clean_value("a\\tb"), "a\tb");
    }

    #[test]
    fn test_host_env_vars_named() {
        // PATH is present in any environment the test suite runs in.
        let vars = host_env_vars_named(&["PATH", "TFTEST_SURELY_UNSET_VARIABLE"]);
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name, "PATH");

        let all = host_env_vars();
        assert!(all.contains_key("PATH"));
    }
}
