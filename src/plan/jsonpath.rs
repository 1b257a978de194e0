//! Generic assertions driven by JSONPath queries over the raw plan.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json_path::JsonPath;
use tracing::debug;

use crate::error::{AssertionError, Result};

use super::assert::{floats_equal, json_kind};

/// How the queried value is compared with the expectation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Substring for strings, element for arrays, key for objects.
    Contains,
    /// Negation of [`Comparison::Contains`].
    NotContains,
    /// Value equality. Numbers compare by value regardless of representation.
    #[default]
    Equal,
}

/// A named JSONPath expectation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonPathCase {
    /// Name reported on failure.
    pub name: String,
    /// Expected value.
    pub expected: Value,
    /// JSONPath query, `$.a.b` or `{.a.b}`.
    pub query: String,
    /// Skip the kind check between the match and the expectation.
    #[serde(default)]
    pub allow_different_type: bool,
    /// Comparison to apply.
    #[serde(default)]
    pub comparison: Comparison,
}

impl JsonPathCase {
    /// Creates an equality case.
    pub fn new(name: impl Into<String>, query: impl Into<String>, expected: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            expected: expected.into(),
            query: query.into(),
            allow_different_type: false,
            comparison: Comparison::Equal,
        }
    }

    /// Sets the comparison.
    #[must_use]
    pub const fn comparison(mut self, comparison: Comparison) -> Self {
        self.comparison = comparison;
        self
    }

    /// Allows the match and the expectation to have different kinds.
    #[must_use]
    pub const fn allow_different_type(mut self) -> Self {
        self.allow_different_type = true;
        self
    }

    fn evaluate(&self, json: &Value) -> std::result::Result<(), String> {
        let query = normalize_query(&self.query);
        let path = JsonPath::parse(&query).map_err(|e| {
            AssertionError::InvalidJsonPath {
                query: query.clone(),
                message: e.to_string(),
            }
            .to_string()
        })?;

        let results: Vec<&Value> = path.query(json).all();
        debug!("JSONPath {query} returned {} match(es)", results.len());

        if let Value::Array(expected) = &self.expected {
            return compare_list(self.comparison, &results, expected)
                .map_err(|msg| format!("{msg}, query: {query}"));
        }

        let Some(actual) = results.first().copied() else {
            return Err(format!("query returned no results, query: {query}"));
        };

        if !self.allow_different_type && json_kind(actual) != json_kind(&self.expected) {
            return Err(format!(
                "expected a {} but found a {}, query: {query}",
                json_kind(&self.expected),
                json_kind(actual)
            ));
        }

        compare_one(self.comparison, actual, &self.expected)
            .map_err(|msg| format!("{msg}, query: {query}"))
    }
}

/// Turns `{.a.b}` and `.a.b` into `$.a.b`. Queries starting with `$` are
/// returned as is.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim();
    let inner = trimmed
        .strip_prefix('{')
        .and_then(|q| q.strip_suffix('}'))
        .unwrap_or(trimmed)
        .trim();

    if inner.starts_with('$') {
        inner.to_string()
    } else if inner.starts_with('.') || inner.starts_with('[') {
        format!("${inner}")
    } else {
        format!("$.{inner}")
    }
}

/// Evaluates every case against `json` and reports all failures together.
///
/// # Errors
///
/// Returns [`AssertionError::JsonPathCases`] with one line per failing case.
pub fn assert_json_path(json: &Value, cases: &[JsonPathCase]) -> Result<()> {
    let failures: Vec<String> = cases
        .iter()
        .filter_map(|case| {
            case.evaluate(json)
                .err()
                .map(|msg| format!("{}: {msg}", case.name))
        })
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(AssertionError::JsonPathCases { failures }.into())
    }
}

fn compare_list(
    comparison: Comparison,
    results: &[&Value],
    expected: &[Value],
) -> std::result::Result<(), String> {
    let in_results = |e: &Value| results.iter().any(|r| values_equal(r, e));

    let ok = match comparison {
        Comparison::Equal => {
            results.len() == expected.len()
                && results.iter().zip(expected).all(|(r, e)| values_equal(r, e))
        }
        Comparison::Contains => expected.iter().all(in_results),
        Comparison::NotContains => !expected.iter().any(in_results),
    };

    if ok {
        Ok(())
    } else {
        let actual = Value::Array(results.iter().map(|v| (*v).clone()).collect());
        Err(failure_message(comparison, &Value::Array(expected.to_vec()), &actual))
    }
}

fn compare_one(comparison: Comparison, actual: &Value, expected: &Value) -> std::result::Result<(), String> {
    let ok = match comparison {
        Comparison::Equal => values_equal(actual, expected),
        Comparison::Contains => contains(actual, expected)?,
        Comparison::NotContains => !contains(actual, expected)?,
    };

    if ok {
        Ok(())
    } else {
        Err(failure_message(comparison, expected, actual))
    }
}

fn contains(actual: &Value, expected: &Value) -> std::result::Result<bool, String> {
    match (actual, expected) {
        (Value::String(haystack), Value::String(needle)) => Ok(haystack.contains(needle.as_str())),
        (Value::String(haystack), other) => Ok(haystack.contains(&other.to_string())),
        (Value::Array(items), _) => Ok(items.iter().any(|item| values_equal(item, expected))),
        (Value::Object(map), Value::String(key)) => Ok(map.contains_key(key)),
        _ => Err(format!(
            "cannot check whether a {} contains a {}",
            json_kind(actual),
            json_kind(expected)
        )),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => floats_equal(x, y),
            _ => x == y,
        },
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn failure_message(comparison: Comparison, expected: &Value, actual: &Value) -> String {
    match comparison {
        Comparison::Contains => {
            format!("Output did not contain the expected value. Expected: {expected}, Actual: {actual}")
        }
        Comparison::NotContains => {
            format!("Output is expected NOT to contain the value. Expected: {expected}, Actual: {actual}")
        }
        Comparison::Equal => {
            format!("Output did not match with expected value. Expected: {expected}, Actual: {actual}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfTestError;
    use serde_json::json;

    fn plan() -> Value {
        json!({
            "variables": {"random_length": {"value": 10}},
            "planned_values": {
                "root_module": {
                    "resources": [
                        {"address": "random_string.a", "values": {"length": 10, "special": false}},
                        {"address": "random_string.b", "values": {"length": 12, "special": true}}
                    ]
                }
            },
            "resource_changes": [
                {"address": "random_string.a", "change": {"actions": ["create"]}}
            ]
        })
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("{.variables.x.value}"), "$.variables.x.value");
        assert_eq!(normalize_query(".variables"), "$.variables");
        assert_eq!(normalize_query("$.variables"), "$.variables");
        assert_eq!(normalize_query("variables.x"), "$.variables.x");
    }

    #[test]
    fn test_equal_cases() {
        let cases = vec![
            JsonPathCase::new("length", "$.variables.random_length.value", 10),
            JsonPathCase::new("address", "{.resource_changes[0].address}", "random_string.a"),
            JsonPathCase::new(
                "all lengths",
                "$.planned_values.root_module.resources[*].values.length",
                json!([10, 12]),
            ),
        ];

        assert!(assert_json_path(&plan(), &cases).is_ok());
    }

    #[test]
    fn test_contains_cases() {
        let cases = vec![
            JsonPathCase::new("substring", "$.resource_changes[0].address", "random_string")
                .comparison(Comparison::Contains),
            JsonPathCase::new("element", "$.resource_changes[0].change.actions", "create")
                .comparison(Comparison::Contains)
                .allow_different_type(),
            JsonPathCase::new("key", "$.variables", "random_length")
                .comparison(Comparison::Contains)
                .allow_different_type(),
            JsonPathCase::new("absent", "$.resource_changes[0].address", "aws_")
                .comparison(Comparison::NotContains),
        ];

        assert!(assert_json_path(&plan(), &cases).is_ok());
    }

    #[test]
    fn test_type_mismatch_fails() {
        let cases = vec![JsonPathCase::new("length", "$.variables.random_length.value", "10")];
        let err = assert_json_path(&plan(), &cases).unwrap_err();
        assert!(err.to_string().contains("expected a string but found a number"));

        let relaxed = vec![
            JsonPathCase::new("length", "$.variables.random_length.value", "10")
                .comparison(Comparison::Contains)
                .allow_different_type(),
        ];
        assert!(assert_json_path(&plan(), &relaxed).is_err());
    }

    #[test]
    fn test_all_failures_are_reported() {
        let cases = vec![
            JsonPathCase::new("ok", "$.variables.random_length.value", 10),
            JsonPathCase::new("wrong value", "$.variables.random_length.value", 11),
            JsonPathCase::new("no match", "$.outputs.missing", "x"),
            JsonPathCase::new("bad query", "$[?(", "x"),
        ];

        let err = assert_json_path(&plan(), &cases).unwrap_err();
        let TfTestError::Assertion(AssertionError::JsonPathCases { failures }) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(failures.len(), 3);
        assert!(failures[0].starts_with("wrong value:"));
        assert!(failures[1].contains("query returned no results"));
        assert!(failures[2].contains("invalid JSONPath query"));
    }

    #[test]
    fn test_list_expectation_compares_whole_result() {
        let cases = vec![JsonPathCase::new(
            "lengths",
            "$.planned_values.root_module.resources[*].values.length",
            json!([10]),
        )];
        assert!(assert_json_path(&plan(), &cases).is_err());
    }
}
