//! Plan, apply and destroy stages with their assertions.

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{DirError, Result};
use crate::plan::{
    ChangeKind, JsonPathCase, PlanOutput, assert_json_path, expect_any_changes,
    expect_change_counts, expect_created_count, expect_no_changes, expect_resources,
    expect_resources_changed, expect_variable_value,
};
use crate::terraform::{CommandRunner, Terraform, TerraformOptions, TerraformRunner};

/// The stages a test can run against a module.
///
/// Plain stages return the command output. Asserting stages run `init`,
/// `plan` and `show -json`, then check the decoded plan.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Runs `destroy`.
    async fn destroy_stage(&self, options: &TerraformOptions) -> Result<String>;

    /// Runs `init` and `plan`.
    async fn plan_stage(&self, options: &TerraformOptions) -> Result<String>;

    /// Runs `init` and `apply`.
    async fn apply_stage(&self, options: &TerraformOptions) -> Result<String>;

    /// Expects exactly `expected` resources to be created.
    async fn plan_stage_with_expected_changes(
        &self,
        options: &TerraformOptions,
        expected: usize,
    ) -> Result<()>;

    /// Expects the given numbers of creates, deletes and updates.
    async fn plan_stage_with_detailed_expected_changes(
        &self,
        options: &TerraformOptions,
        adds: usize,
        deletes: usize,
        updates: usize,
    ) -> Result<()>;

    /// Expects at least one resource to change.
    async fn plan_stage_with_any_sort_of_changes(&self, options: &TerraformOptions) -> Result<()>;

    /// Expects no resource to change.
    async fn plan_stage_expected_no_changes(&self, options: &TerraformOptions) -> Result<()>;

    /// Expects every address to be created, deleted, updated or replaced.
    async fn plan_with_specific_resources_that_will_change(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()>;

    /// Expects every address to be created.
    async fn plan_with_resources_expected_to_be_created(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()>;

    /// Expects every address to be deleted.
    async fn plan_with_resources_expected_to_be_deleted(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()>;

    /// Expects every address to be updated in place.
    async fn plan_with_resources_expected_to_be_updated(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()>;

    /// Expects a root variable recorded in the plan to equal `expected`.
    async fn plan_with_specific_variable_value_to_expect(
        &self,
        options: &TerraformOptions,
        variable: &str,
        expected: &str,
    ) -> Result<()>;

    /// Evaluates every JSONPath case against the raw plan JSON.
    async fn plan_and_assert_json_with_json_path(
        &self,
        options: &TerraformOptions,
        cases: &[JsonPathCase],
    ) -> Result<()>;
}

/// [`Stage`] implementation backed by a [`Terraform`] client.
#[derive(Debug, Clone, Default)]
pub struct StageClient<R = CommandRunner> {
    terraform: Terraform<R>,
}

impl<R: TerraformRunner> StageClient<R> {
    /// Creates a stage client around a runner.
    #[must_use]
    pub const fn new(runner: R) -> Self {
        Self {
            terraform: Terraform::new(runner),
        }
    }

    /// Returns the Terraform client.
    #[must_use]
    pub const fn terraform(&self) -> &Terraform<R> {
        &self.terraform
    }

    /// Runs `init`, `plan` and `show -json` and decodes the plan.
    ///
    /// Without a configured plan file, a uniquely named one is written to the
    /// module directory and removed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if a command fails or the plan cannot be decoded.
    pub async fn plan_output(&self, options: &TerraformOptions) -> Result<PlanOutput> {
        if options.plan_file_path.is_some() {
            return self.terraform.init_and_plan_and_show_with_struct(options).await;
        }

        // The plan file is passed to a command running inside terraform_dir.
        let tf_dir = std::path::absolute(&options.terraform_dir)
            .map_err(|e| DirError::access(&options.terraform_dir, e.to_string()))?;
        let plan_file = tf_dir.join(format!("tftest-{}.tfplan", Uuid::new_v4()));
        let mut scoped = options.clone();
        scoped.plan_file_path = Some(plan_file.clone());

        let result = self.terraform.init_and_plan_and_show_with_struct(&scoped).await;

        if let Err(e) = tokio::fs::remove_file(&plan_file).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove plan file {}: {e}", plan_file.display());
            }
        }

        result
    }

    async fn check_resources(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
        kind: ChangeKind,
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_resources(&out.plan, resources, kind)
    }
}

#[async_trait]
impl<R: TerraformRunner> Stage for StageClient<R> {
    async fn destroy_stage(&self, options: &TerraformOptions) -> Result<String> {
        info!("Destroy stage in {}", options.terraform_dir.display());
        self.terraform.destroy(options).await
    }

    async fn plan_stage(&self, options: &TerraformOptions) -> Result<String> {
        info!("Plan stage in {}", options.terraform_dir.display());
        self.terraform.init_and_plan(options).await
    }

    async fn apply_stage(&self, options: &TerraformOptions) -> Result<String> {
        info!("Apply stage in {}", options.terraform_dir.display());
        self.terraform.init_and_apply(options).await
    }

    async fn plan_stage_with_expected_changes(
        &self,
        options: &TerraformOptions,
        expected: usize,
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_created_count(&out.plan, expected)
    }

    async fn plan_stage_with_detailed_expected_changes(
        &self,
        options: &TerraformOptions,
        adds: usize,
        deletes: usize,
        updates: usize,
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_change_counts(&out.plan, adds, deletes, updates)
    }

    async fn plan_stage_with_any_sort_of_changes(&self, options: &TerraformOptions) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_any_changes(&out.plan)
    }

    async fn plan_stage_expected_no_changes(&self, options: &TerraformOptions) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_no_changes(&out.plan)
    }

    async fn plan_with_specific_resources_that_will_change(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_resources_changed(&out.plan, resources)
    }

    async fn plan_with_resources_expected_to_be_created(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()> {
        self.check_resources(options, resources, ChangeKind::Created).await
    }

    async fn plan_with_resources_expected_to_be_deleted(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()> {
        self.check_resources(options, resources, ChangeKind::Deleted).await
    }

    async fn plan_with_resources_expected_to_be_updated(
        &self,
        options: &TerraformOptions,
        resources: &[&str],
    ) -> Result<()> {
        self.check_resources(options, resources, ChangeKind::Updated).await
    }

    async fn plan_with_specific_variable_value_to_expect(
        &self,
        options: &TerraformOptions,
        variable: &str,
        expected: &str,
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        expect_variable_value(&out.plan, variable, expected)
    }

    async fn plan_and_assert_json_with_json_path(
        &self,
        options: &TerraformOptions,
        cases: &[JsonPathCase],
    ) -> Result<()> {
        let out = self.plan_output(options).await?;
        assert_json_path(&out.json, cases)
    }
}
