//! Assertions over a decoded plan.
//!
//! Every function returns an [`AssertionError`] wrapped in the crate error on
//! failure, so a test returning `tftest::Result<()>` stops at the first one.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::error::{AssertionError, Result};

use super::summary::ChangeSummary;
use super::types::{Actions, PlanJson};

/// The kind of change a resource is expected to undergo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A pure create.
    Created,
    /// An in-place update.
    Updated,
    /// A pure delete.
    Deleted,
}

impl ChangeKind {
    fn matches(self, actions: &Actions) -> bool {
        match self {
            Self::Created => actions.is_create(),
            Self::Updated => actions.is_update(),
            Self::Deleted => actions.is_delete(),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Updated => write!(f, "updated"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Checks that exactly `expected` resources are planned for creation.
///
/// # Errors
///
/// Returns [`AssertionError::CountMismatch`] when the count differs.
pub fn expect_created_count(plan: &PlanJson, expected: usize) -> Result<()> {
    let actual = ChangeSummary::from_plan(plan).creates;
    check_count("changes", expected, actual)
}

/// Checks the number of creates, deletes and in-place updates.
///
/// Replacements are not counted as either a create or a delete.
///
/// # Errors
///
/// Returns [`AssertionError::CountMismatch`] for the first count that
/// differs, in the order additions, deletions, updates.
pub fn expect_change_counts(
    plan: &PlanJson,
    adds: usize,
    deletes: usize,
    updates: usize,
) -> Result<()> {
    let summary = ChangeSummary::from_plan(plan);
    debug!("Plan summary: {summary}");

    check_count("additions", adds, summary.creates)?;
    check_count("deletions", deletes, summary.deletes)?;
    check_count("updates", updates, summary.updates)
}

/// Checks that at least one resource changes.
///
/// # Errors
///
/// Returns [`AssertionError::NoChanges`] when nothing changes.
pub fn expect_any_changes(plan: &PlanJson) -> Result<()> {
    if plan.changes().next().is_none() {
        return Err(AssertionError::NoChanges.into());
    }
    Ok(())
}

/// Checks that no resource changes. No-op and read entries are ignored.
///
/// # Errors
///
/// Returns [`AssertionError::UnexpectedChanges`] listing the changing
/// addresses.
pub fn expect_no_changes(plan: &PlanJson) -> Result<()> {
    let changed: Vec<&str> = plan.changes().map(|rc| rc.address.as_str()).collect();
    if changed.is_empty() {
        return Ok(());
    }

    Err(AssertionError::UnexpectedChanges {
        count: changed.len(),
        addresses: changed.join(", "),
    }
    .into())
}

/// Checks that each address is created, deleted, updated or replaced.
///
/// # Errors
///
/// Returns [`AssertionError::ResourceNotChanged`] for the first address
/// without such a change.
pub fn expect_resources_changed<S: AsRef<str>>(plan: &PlanJson, addresses: &[S]) -> Result<()> {
    check_resources(plan, addresses, "changed", |actions| {
        actions.is_create() || actions.is_delete() || actions.is_update() || actions.is_replace()
    })
}

/// Checks that each address undergoes exactly the requested kind of change.
///
/// Plan entries for other addresses are ignored. An address that never shows
/// up with the requested action fails the assertion.
///
/// # Errors
///
/// Returns [`AssertionError::ResourceNotChanged`] for the first address
/// without the requested change.
pub fn expect_resources<S: AsRef<str>>(
    plan: &PlanJson,
    addresses: &[S],
    kind: ChangeKind,
) -> Result<()> {
    check_resources(plan, addresses, &kind.to_string(), |actions| kind.matches(actions))
}

fn check_resources<S: AsRef<str>>(
    plan: &PlanJson,
    addresses: &[S],
    kind: &str,
    check: impl Fn(&Actions) -> bool,
) -> Result<()> {
    let mut found: BTreeMap<&str, bool> = addresses.iter().map(|a| (a.as_ref(), false)).collect();

    for rc in &plan.resource_changes {
        if let Some(seen) = found.get_mut(rc.address.as_str()) {
            if check(&rc.change.actions) {
                *seen = true;
            }
        }
    }

    // Report in the caller's order.
    for address in addresses {
        if !found.get(address.as_ref()).copied().unwrap_or(false) {
            return Err(AssertionError::ResourceNotChanged {
                address: address.as_ref().to_string(),
                kind: kind.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

/// Checks that a root variable recorded in the plan equals `expected`.
///
/// # Errors
///
/// Returns [`AssertionError::VariableNotFound`] if the variable is absent or
/// the comparison error from [`compare_values`].
pub fn expect_variable_value(plan: &PlanJson, name: &str, expected: &str) -> Result<()> {
    let variable = plan
        .variables
        .get(name)
        .ok_or_else(|| AssertionError::VariableNotFound {
            name: name.to_string(),
        })?;

    compare_values(name, &variable.value, expected)
}

/// Compares a JSON value with the textual form of the expected value.
///
/// The text is read as the kind of `actual`: strings compare as is, numbers
/// are parsed as numbers (an integer also matches an equal float such as
/// `10.0`), booleans accept `1`/`0`, `t`/`f` and `true`/`false` in any of
/// the usual cases. Any other kind is unsupported.
///
/// # Errors
///
/// Returns a mismatch, an unparsable expectation or an unsupported kind.
pub fn compare_values(name: &str, actual: &Value, expected: &str) -> Result<()> {
    let invalid = |kind: &'static str| AssertionError::InvalidExpected {
        name: name.to_string(),
        kind,
        expected: expected.to_string(),
    };

    let equal = match actual {
        Value::String(s) => s == expected,
        Value::Number(n) => {
            let expected = expected.trim();
            if let Some(int) = n.as_i64().map(i128::from).or_else(|| n.as_u64().map(i128::from)) {
                if let Ok(parsed) = expected.parse::<i128>() {
                    int == parsed
                } else {
                    // "10.0" or "1e1" still describe an integer value.
                    let float = n.as_f64().ok_or_else(|| invalid("integer"))?;
                    let parsed = expected.parse::<f64>().map_err(|_| invalid("integer"))?;
                    floats_equal(float, parsed)
                }
            } else {
                let float = n.as_f64().ok_or_else(|| invalid("float"))?;
                let parsed = expected.parse::<f64>().map_err(|_| invalid("float"))?;
                floats_equal(float, parsed)
            }
        }
        Value::Bool(b) => {
            let parsed = parse_bool(expected.trim()).ok_or_else(|| invalid("boolean"))?;
            *b == parsed
        }
        other => {
            return Err(AssertionError::UnsupportedType {
                name: name.to_string(),
                kind: json_kind(other),
            }
            .into());
        }
    };

    if equal {
        Ok(())
    } else {
        Err(AssertionError::mismatch(name, expected, actual).into())
    }
}

/// Reads the spellings `1`, `t`, `true` (and `0`, `f`, `false`) in lower,
/// upper or title case.
fn parse_bool(text: &str) -> Option<bool> {
    match text {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

pub(crate) fn floats_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0)
}

/// Name of the JSON kind of a value.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn check_count(kind: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AssertionError::CountMismatch {
            kind,
            expected,
            actual,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TfTestError;
    use crate::plan::PlanOutput;
    use serde_json::json;

    // Actions are comma separated, e.g. "delete,create".
    fn plan(changes: &[(&str, &str)]) -> PlanJson {
        let resource_changes: Vec<Value> = changes
            .iter()
            .map(|(address, actions)| {
                let actions: Vec<&str> = actions.split(',').collect();
                json!({"address": address, "change": {"actions": actions}})
            })
            .collect();
        let doc = json!({
            "format_version": "1.2",
            "variables": {
                "random_length": {"value": 10},
                "ratio": {"value": 0.5},
                "enabled": {"value": true},
                "name": {"value": "demo"},
                "tags": {"value": {"env": "dev"}}
            },
            "resource_changes": resource_changes
        });
        PlanOutput::parse(&doc.to_string()).expect("plan should decode").plan
    }

    #[test]
    fn test_empty_plan() {
        let p = plan(&[]);
        assert!(matches!(
            expect_any_changes(&p),
            Err(TfTestError::Assertion(AssertionError::NoChanges))
        ));
        assert!(expect_no_changes(&p).is_ok());
    }

    #[test]
    fn test_no_op_entries_are_not_changes() {
        let p = plan(&[("random_id.a", "no-op"), ("data.x.y", "read")]);
        assert!(expect_no_changes(&p).is_ok());
        assert!(expect_any_changes(&p).is_err());
    }

    #[test]
    fn test_unexpected_changes_lists_addresses() {
        let p = plan(&[("random_id.a", "create"), ("random_id.b", "update")]);
        let err = expect_no_changes(&p).unwrap_err();
        assert!(err.to_string().contains("random_id.a, random_id.b"));
    }

    #[test]
    fn test_created_resource() {
        let p = plan(&[("random_id.this", "create"), ("random_id.other", "delete")]);

        assert!(expect_resources(&p, &["random_id.this"], ChangeKind::Created).is_ok());
        let err = expect_resources(&p, &["random_id.this"], ChangeKind::Deleted).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Assertion failed: Resource random_id.this was not marked to be deleted but was expected to"
        );
    }

    #[test]
    fn test_missing_address_fails() {
        let p = plan(&[("random_id.this", "create")]);
        let err = expect_resources(&p, &["random_id.missing"], ChangeKind::Created).unwrap_err();
        assert!(err.to_string().contains("random_id.missing"));
    }

    #[test]
    fn test_resources_changed_includes_replace() {
        let p = plan(&[
            ("random_id.a", "delete,create"),
            ("random_id.b", "update"),
            ("random_id.c", "no-op"),
        ]);
        assert!(expect_resources_changed(&p, &["random_id.a", "random_id.b"]).is_ok());
        assert!(expect_resources_changed(&p, &["random_id.c"]).is_err());
    }

    #[test]
    fn test_counts() {
        let p = plan(&[
            ("a", "create"),
            ("b", "create"),
            ("c", "delete"),
            ("d", "update"),
            ("e", "create,delete"),
        ]);

        assert!(expect_created_count(&p, 2).is_ok());
        assert!(expect_created_count(&p, 3).is_err());
        assert!(expect_change_counts(&p, 2, 1, 1).is_ok());

        let err = expect_change_counts(&p, 2, 0, 1).unwrap_err();
        assert!(matches!(
            err,
            TfTestError::Assertion(AssertionError::CountMismatch {
                kind: "deletions",
                expected: 0,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_variable_values() {
        let p = plan(&[]);

        assert!(expect_variable_value(&p, "random_length", "10").is_ok());
        assert!(expect_variable_value(&p, "random_length", "11").is_err());
        assert!(expect_variable_value(&p, "ratio", "0.5").is_ok());
        assert!(expect_variable_value(&p, "enabled", "true").is_ok());
        assert!(expect_variable_value(&p, "name", "demo").is_ok());
        assert!(matches!(
            expect_variable_value(&p, "missing", "x"),
            Err(TfTestError::Assertion(AssertionError::VariableNotFound { .. }))
        ));
    }

    #[test]
    fn test_variable_value_lenient_spellings() {
        let p = plan(&[]);

        assert!(expect_variable_value(&p, "random_length", "10.0").is_ok());
        assert!(expect_variable_value(&p, "random_length", "1e1").is_ok());
        assert!(expect_variable_value(&p, "random_length", " 10 ").is_ok());
        assert!(expect_variable_value(&p, "random_length", "10.5").is_err());

        for spelling in ["True", "TRUE", "t", "T", "1"] {
            assert!(
                expect_variable_value(&p, "enabled", spelling).is_ok(),
                "{spelling} should read as true"
            );
        }
        for spelling in ["False", "F", "0"] {
            assert!(matches!(
                expect_variable_value(&p, "enabled", spelling),
                Err(TfTestError::Assertion(AssertionError::ValueMismatch { .. }))
            ));
        }
    }

    #[test]
    fn test_variable_value_type_errors() {
        let p = plan(&[]);

        assert!(matches!(
            expect_variable_value(&p, "random_length", "ten"),
            Err(TfTestError::Assertion(AssertionError::InvalidExpected { kind: "integer", .. }))
        ));
        assert!(matches!(
            expect_variable_value(&p, "enabled", "yes"),
            Err(TfTestError::Assertion(AssertionError::InvalidExpected { kind: "boolean", .. }))
        ));
        let err = expect_variable_value(&p, "random_length", "ten").unwrap_err();
        assert!(
            err.to_string()
                .ends_with("Expected value for variable random_length cannot be read as integer: ten")
        );
        assert!(matches!(
            expect_variable_value(&p, "tags", "{}"),
            Err(TfTestError::Assertion(AssertionError::UnsupportedType { kind: "object", .. }))
        ));
    }
}
