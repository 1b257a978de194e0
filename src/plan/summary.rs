//! Change counts for a plan.

use std::fmt;

use super::types::PlanJson;

/// Number of resources per kind of change.
///
/// Replacements are counted on their own and do not add to `creates` or
/// `deletes`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// Resources to create.
    pub creates: usize,
    /// Resources to update in place.
    pub updates: usize,
    /// Resources to delete.
    pub deletes: usize,
    /// Resources to replace.
    pub replaces: usize,
    /// Resources with a no-op or read action.
    pub unchanged: usize,
}

impl ChangeSummary {
    /// Counts the resource changes of a plan.
    #[must_use]
    pub fn from_plan(plan: &PlanJson) -> Self {
        let mut summary = Self::default();

        for rc in &plan.resource_changes {
            let actions = &rc.change.actions;
            if actions.is_create() {
                summary.creates += 1;
            } else if actions.is_delete() {
                summary.deletes += 1;
            } else if actions.is_update() {
                summary.updates += 1;
            } else if actions.is_replace() {
                summary.replaces += 1;
            } else if !actions.is_change() {
                summary.unchanged += 1;
            }
        }

        summary
    }

    /// Returns true if anything changes.
    #[must_use]
    pub const fn has_changes(&self) -> bool {
        self.creates > 0 || self.updates > 0 || self.deletes > 0 || self.replaces > 0
    }

    /// Total number of changing resources.
    #[must_use]
    pub const fn total_changes(&self) -> usize {
        self.creates + self.updates + self.deletes + self.replaces
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} to replace",
            self.creates, self.updates, self.deletes, self.replaces
        )?;
        if self.unchanged > 0 {
            write!(f, ", {} unchanged", self.unchanged)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Action, Actions, Change, ResourceChange};

    fn rc(address: &str, actions: &[Action]) -> ResourceChange {
        ResourceChange {
            address: address.to_string(),
            module_address: None,
            mode: String::from("managed"),
            resource_type: String::from("random_id"),
            name: address.to_string(),
            change: Change {
                actions: Actions(actions.to_vec()),
                ..Change::default()
            },
        }
    }

    #[test]
    fn test_summary_counts() {
        let plan = PlanJson {
            resource_changes: vec![
                rc("a", &[Action::Create]),
                rc("b", &[Action::Create]),
                rc("c", &[Action::Update]),
                rc("d", &[Action::Delete, Action::Create]),
                rc("e", &[Action::NoOp]),
            ],
            ..PlanJson::default()
        };

        let summary = ChangeSummary::from_plan(&plan);
        assert_eq!(summary.creates, 2);
        assert_eq!(summary.updates, 1);
        assert_eq!(summary.deletes, 0);
        assert_eq!(summary.replaces, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total_changes(), 4);
        assert_eq!(
            summary.to_string(),
            "2 to create, 1 to update, 0 to delete, 1 to replace, 1 unchanged"
        );
    }

    #[test]
    fn test_empty_plan_has_no_changes() {
        let summary = ChangeSummary::from_plan(&PlanJson::default());
        assert!(!summary.has_changes());
    }
}
