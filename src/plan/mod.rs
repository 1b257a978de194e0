//! Terraform plan decoding and assertions.
//!
//! A plan is produced by `show -json` and decoded into [`PlanOutput`], which
//! keeps both the typed document and the raw JSON. The assertion functions
//! work on the typed document; JSONPath cases work on the raw JSON.

mod assert;
mod jsonpath;
mod summary;
mod types;

pub use assert::{
    ChangeKind, compare_values, expect_any_changes, expect_change_counts, expect_created_count,
    expect_no_changes, expect_resources, expect_resources_changed, expect_variable_value,
};
pub use jsonpath::{Comparison, JsonPathCase, assert_json_path, normalize_query};
pub use summary::ChangeSummary;
pub use types::{Action, Actions, Change, PlanJson, PlanOutput, PlanVariable, ResourceChange};
