//! Argument construction for each subcommand.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::options::{Binary, TerraformOptions};

/// Renders variables as `-var key=value` pairs, in key order.
#[must_use]
pub fn format_vars_as_args(vars: &BTreeMap<String, Value>) -> Vec<String> {
    vars.iter()
        .flat_map(|(key, value)| [String::from("-var"), format!("{key}={}", format_var_value(value))])
        .collect()
}

/// Renders a variable value the way Terraform expects it on the command line.
///
/// Strings are passed raw; everything else as an HCL literal.
#[must_use]
pub fn format_var_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => hcl_literal(other),
    }
}

fn hcl_literal(value: &Value) -> String {
    match value {
        Value::Null => String::from("null"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // JSON string escaping is valid HCL.
        Value::String(s) => Value::String(s.clone()).to_string(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(hcl_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{} = {}", Value::String(k.clone()), hcl_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

fn var_file_args(options: &TerraformOptions) -> Vec<String> {
    options
        .var_files
        .iter()
        .map(|file| format!("-var-file={file}"))
        .collect()
}

fn finish(options: &TerraformOptions, mut args: Vec<String>) -> Vec<String> {
    if options.binary == Binary::Terragrunt {
        args.push(String::from("--terragrunt-non-interactive"));
    }
    if options.no_color {
        args.push(String::from("-no-color"));
    }
    args
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

pub(crate) fn init_args(options: &TerraformOptions) -> Vec<String> {
    finish(options, strings(&["init", "-upgrade=false"]))
}

pub(crate) fn plan_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = strings(&["plan", "-input=false", "-lock=false"]);
    args.extend(format_vars_as_args(&options.vars));
    args.extend(var_file_args(options));
    if let Some(plan_file) = &options.plan_file_path {
        args.push(format!("-out={}", plan_file.display()));
    }
    finish(options, args)
}

pub(crate) fn apply_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = strings(&["apply", "-input=false", "-auto-approve"]);
    args.extend(format_vars_as_args(&options.vars));
    args.extend(var_file_args(options));
    finish(options, args)
}

pub(crate) fn destroy_args(options: &TerraformOptions) -> Vec<String> {
    let mut args = strings(&["destroy", "-auto-approve", "-input=false"]);
    args.extend(format_vars_as_args(&options.vars));
    args.extend(var_file_args(options));
    finish(options, args)
}

pub(crate) fn show_args(options: &TerraformOptions, plan_file: &Path) -> Vec<String> {
    let args = vec![
        String::from("show"),
        String::from("-json"),
        plan_file.display().to_string(),
    ];
    finish(options, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_var_values() {
        assert_eq!(format_var_value(&json!("t2.micro")), "t2.micro");
        assert_eq!(format_var_value(&json!(10)), "10");
        assert_eq!(format_var_value(&json!(true)), "true");
        assert_eq!(format_var_value(&json!(null)), "null");
        assert_eq!(format_var_value(&json!(["a", 1])), r#"["a", 1]"#);
        assert_eq!(
            format_var_value(&json!({"env": "dev", "tags": ["x"]})),
            r#"{"env" = "dev", "tags" = ["x"]}"#
        );
    }

    #[test]
    fn test_vars_are_sorted() {
        let vars = BTreeMap::from([
            (String::from("zone"), json!("a")),
            (String::from("count"), json!(3)),
        ]);

        assert_eq!(
            format_vars_as_args(&vars),
            vec!["-var", "count=3", "-var", "zone=a"]
        );
    }

    #[test]
    fn test_plan_args() {
        let mut options = TerraformOptions::new("module")
            .add_vars([("random_length_password", json!(10))])
            .add_var_files(["fixtures/override.tfvars"]);
        options.plan_file_path = Some("module/plan.out".into());

        assert_eq!(
            plan_args(&options),
            vec![
                "plan",
                "-input=false",
                "-lock=false",
                "-var",
                "random_length_password=10",
                "-var-file=fixtures/override.tfvars",
                "-out=module/plan.out",
                "-no-color",
            ]
        );
    }

    #[test]
    fn test_terragrunt_and_color_flags() {
        let mut options = TerraformOptions::new("module");
        options.binary = Binary::Terragrunt;
        options.no_color = false;

        assert_eq!(
            init_args(&options),
            vec!["init", "-upgrade=false", "--terragrunt-non-interactive"]
        );
        assert_eq!(
            show_args(&options, Path::new("plan.out")),
            vec!["show", "-json", "plan.out", "--terragrunt-non-interactive"]
        );
    }

    #[test]
    fn test_apply_and_destroy_args() {
        let options = TerraformOptions::new("module").add_var_files(["a.tfvars"]);

        assert_eq!(
            apply_args(&options),
            vec!["apply", "-input=false", "-auto-approve", "-var-file=a.tfvars", "-no-color"]
        );
        assert_eq!(
            destroy_args(&options),
            vec!["destroy", "-auto-approve", "-input=false", "-var-file=a.tfvars", "-no-color"]
        );
    }
}
