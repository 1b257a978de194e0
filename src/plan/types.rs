//! Typed view of `terraform show -json`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Result, TerraformError};

/// A single planned action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Nothing to do.
    NoOp,
    /// Resource will be created.
    Create,
    /// Data source will be read.
    Read,
    /// Resource will be updated in place.
    Update,
    /// Resource will be destroyed.
    Delete,
    /// Resource will be removed from state without being destroyed.
    Forget,
    /// Any action this crate does not know about.
    #[serde(other)]
    Unknown,
}

/// The ordered action list of a resource change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actions(pub Vec<Action>);

impl Actions {
    fn is_single(&self, action: Action) -> bool {
        matches!(self.0.as_slice(), [only] if *only == action)
    }

    /// Pure creation.
    #[must_use]
    pub fn is_create(&self) -> bool {
        self.is_single(Action::Create)
    }

    /// Pure deletion.
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.is_single(Action::Delete)
    }

    /// In-place update.
    #[must_use]
    pub fn is_update(&self) -> bool {
        self.is_single(Action::Update)
    }

    /// Nothing to do.
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.is_single(Action::NoOp)
    }

    /// Data source read.
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.is_single(Action::Read)
    }

    /// Delete then create, or create then delete.
    #[must_use]
    pub fn is_replace(&self) -> bool {
        matches!(
            self.0.as_slice(),
            [Action::Delete, Action::Create] | [Action::Create, Action::Delete]
        )
    }

    /// Anything other than a no-op or a read.
    #[must_use]
    pub fn is_change(&self) -> bool {
        !self.0.is_empty() && !self.is_no_op() && !self.is_read()
    }
}

/// Before/after values and the actions of one change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Planned actions.
    #[serde(default)]
    pub actions: Actions,
    /// Value before the change.
    #[serde(default)]
    pub before: Option<Value>,
    /// Value after the change, with unknowns omitted.
    #[serde(default)]
    pub after: Option<Value>,
}

/// One entry of `resource_changes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Full resource address, unique within the plan.
    pub address: String,
    /// Address of the containing module, if any.
    #[serde(default)]
    pub module_address: Option<String>,
    /// `managed` or `data`.
    #[serde(default)]
    pub mode: String,
    /// Resource type.
    #[serde(rename = "type", default)]
    pub resource_type: String,
    /// Resource name.
    #[serde(default)]
    pub name: String,
    /// The change itself.
    pub change: Change,
}

/// A root module variable as recorded in the plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanVariable {
    /// The variable value.
    #[serde(default)]
    pub value: Value,
}

/// The decoded plan document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanJson {
    /// Plan format version.
    #[serde(default)]
    pub format_version: String,
    /// Terraform version that produced the plan.
    #[serde(default)]
    pub terraform_version: String,
    /// Root module variables.
    #[serde(default)]
    pub variables: BTreeMap<String, PlanVariable>,
    /// Per-resource changes.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
    /// Per-output changes.
    #[serde(default)]
    pub output_changes: BTreeMap<String, Change>,
}

impl PlanJson {
    /// Resource changes that actually change something.
    pub fn changes(&self) -> impl Iterator<Item = &ResourceChange> {
        self.resource_changes
            .iter()
            .filter(|rc| rc.change.actions.is_change())
    }

    /// Looks up a resource change by address.
    #[must_use]
    pub fn find(&self, address: &str) -> Option<&ResourceChange> {
        self.resource_changes.iter().find(|rc| rc.address == address)
    }
}

/// A plan as returned by `show -json`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutput {
    /// The raw JSON text.
    pub raw_json: String,
    /// The JSON as an untyped value, for JSONPath queries.
    pub json: Value,
    /// The typed document.
    pub plan: PlanJson,
}

impl PlanOutput {
    /// Decodes the output of `show -json`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a plan document.
    pub fn parse(raw: &str) -> Result<Self> {
        let json: Value = serde_json::from_str(raw.trim())
            .map_err(|e| TerraformError::invalid_plan(e.to_string()))?;
        let plan: PlanJson = serde_json::from_value(json.clone())
            .map_err(|e| TerraformError::invalid_plan(e.to_string()))?;

        Ok(Self {
            raw_json: raw.to_string(),
            json,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAN: &str = r#"{
        "format_version": "1.2",
        "terraform_version": "1.9.5",
        "variables": {"random_length": {"value": 10}},
        "resource_changes": [
            {
                "address": "random_id.this",
                "mode": "managed",
                "type": "random_id",
                "name": "this",
                "change": {"actions": ["create"], "before": null, "after": {"byte_length": 8}}
            },
            {
                "address": "random_string.old",
                "mode": "managed",
                "type": "random_string",
                "name": "old",
                "change": {"actions": ["delete", "create"]}
            },
            {
                "address": "data.local_file.cfg",
                "mode": "data",
                "type": "local_file",
                "name": "cfg",
                "change": {"actions": ["read"]}
            }
        ],
        "planned_values": {}
    }"#;

    #[test]
    fn test_parse_plan() {
        let out = PlanOutput::parse(PLAN).expect("plan should decode");

        assert_eq!(out.plan.terraform_version, "1.9.5");
        assert_eq!(out.plan.resource_changes.len(), 3);
        assert_eq!(out.plan.variables["random_length"].value, serde_json::json!(10));
        assert_eq!(out.plan.changes().count(), 2);
        assert!(out.plan.find("random_id.this").is_some());
        assert!(out.json.get("planned_values").is_some());
    }

    #[test]
    fn test_action_predicates() {
        let create = Actions(vec![Action::Create]);
        let replace = Actions(vec![Action::Create, Action::Delete]);
        let noop = Actions(vec![Action::NoOp]);

        assert!(create.is_create() && create.is_change());
        assert!(!replace.is_create() && !replace.is_delete());
        assert!(replace.is_replace() && replace.is_change());
        assert!(noop.is_no_op() && !noop.is_change());
    }

    #[test]
    fn test_no_op_wire_name() {
        let actions: Actions = serde_json::from_str(r#"["no-op"]"#).expect("decode");
        assert!(actions.is_no_op());

        let unknown: Actions = serde_json::from_str(r#"["teleport"]"#).expect("decode");
        assert_eq!(unknown.0, vec![Action::Unknown]);
    }

    #[test]
    fn test_invalid_plan() {
        assert!(PlanOutput::parse("Error: no plan").is_err());
        assert!(PlanOutput::parse(r#"{"resource_changes": 3}"#).is_err());
    }

    #[test]
    fn test_missing_collections_default() {
        let out = PlanOutput::parse(r#"{"format_version": "1.2"}"#).expect("decode");
        assert!(out.plan.resource_changes.is_empty());
        assert!(out.plan.variables.is_empty());
    }
}
