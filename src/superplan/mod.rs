//! The aggregate preview ("superplan") engine.
//!
//! One preview for the whole environment: every stack's snapshot is pulled
//! and rewritten under a collision-free prefix, configurations are merged
//! into a synthetic local-backend workspace, terraform plans once against
//! the merged snapshot, and the resulting change set is attributed back to
//! the originating stacks.
//!
//! The pipeline is strictly serial; snapshot pulls and the merged-workspace
//! run both require exclusive local filesystem state.

pub mod config;
pub mod providers;
pub mod state;
pub mod summary;
pub mod tagless;

mod lifecycle;
mod vars;

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use serde_json::{json, Value};

use crate::cancel::CancelToken;
use crate::graph;
use crate::paths;
use crate::runner::{Runner, RunnerOptions};
use crate::ui;

const PLAN_FILE_NAME: &str = "superplan.tfplan";
const STATE_FILE_NAME: &str = "superstate.json";
const SUMMARY_FILE_NAME: &str = "superplan-summary.json";

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub root_dir: PathBuf,
    pub output_dir: PathBuf,
    pub terraform_path: PathBuf,
    pub terraform_version: String,
    pub environment: String,
    pub account_id: String,
    pub region: String,
    pub keep_plan_artifacts: bool,
}

impl Options {
    fn apply_defaults(&mut self) {
        if self.root_dir.as_os_str().is_empty() {
            self.root_dir = PathBuf::from(".");
        }
        if self.output_dir.as_os_str().is_empty() {
            self.output_dir = PathBuf::from("superplan");
        }
        if self.environment.is_empty() {
            self.environment = "dev".to_string();
        }
        if self.region.is_empty() {
            self.region = "eu-west-2".to_string();
        }
    }
}

pub fn run(mut opts: Options) -> Result<()> {
    opts.apply_defaults();

    let root_abs = paths::absolutize(&opts.root_dir).context("resolve root directory")?;
    if opts.account_id.is_empty() {
        bail!("account ID is required");
    }
    if opts.terraform_path.as_os_str().is_empty() {
        bail!("terraform binary path is required");
    }

    // S1: discover and order.
    let stack_graph = graph::build(&root_abs).context("error building dependency graph")?;
    let order = graph::topo_sort(&stack_graph).context("dependency resolution failed")?;
    if order.is_empty() {
        bail!("no stacks discovered under {}", root_abs.display());
    }
    println!("Discovered {} stacks", order.len());

    let mut dependencies_by_rel: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut dependents_by_rel: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, stack) in &stack_graph {
        let rel = paths::rel_slash(&root_abs, path);
        for dep in &stack.dependencies {
            let dep_rel = paths::rel_slash(&root_abs, dep);
            dependencies_by_rel
                .entry(rel.clone())
                .or_default()
                .push(dep_rel.clone());
            dependents_by_rel.entry(dep_rel).or_default().push(rel.clone());
        }
    }

    let runner = Runner::new(
        CancelToken::new(),
        RunnerOptions {
            root_dir: opts.root_dir.clone(),
            environment: opts.environment.clone(),
            account_id: opts.account_id.clone(),
            region: opts.region.clone(),
            terraform_path: opts.terraform_path.clone(),
            disable_refresh: false,
        },
    )
    .context("failed to prepare stack runner")?;

    // S2: pull and rewrite every snapshot, accumulating the merged state.
    let mut merged_resources: Vec<Value> = Vec::new();
    let mut merged_outputs = serde_json::Map::new();
    let mut provider_sources: BTreeMap<String, String> = BTreeMap::new();
    let mut prefixes: BTreeMap<PathBuf, String> = BTreeMap::new();
    let mut prefixes_by_rel: BTreeMap<String, String> = BTreeMap::new();
    let mut prefix_to_stack: BTreeMap<String, String> = BTreeMap::new();
    let mut base_version: i64 = 0;
    let mut base_tf_version = String::new();
    let mut serial: i64 = 0;

    for (index, stack_dir) in order.iter().enumerate() {
        let rel = paths::rel_slash(&root_abs, stack_dir);
        let mut prefix = state::sanitize_identifier(
            &stack_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        if prefix.is_empty() {
            prefix = format!("stack_{index}");
        }
        prefixes.insert(stack_dir.clone(), prefix.clone());
        prefixes_by_rel.insert(rel.clone(), prefix.clone());
        prefix_to_stack.insert(prefix.clone(), rel.clone());

        runner
            .init(stack_dir, false)
            .with_context(|| format!("terraform init failed for {rel}"))?;
        let state_json = runner
            .state_pull(stack_dir)
            .with_context(|| format!("terraform state pull failed for {rel}"))?;
        ui::success(&format!("Downloaded state for stack: {rel}"));

        let mut snapshot: Value = serde_json::from_str(&state_json)
            .with_context(|| format!("invalid state file for {rel}"))?;

        let resource_count = state::prefix_resources(&mut snapshot, &prefix)
            .with_context(|| format!("failed to rewrite resources for {rel}"))?;
        let output_count = state::prefix_outputs(&mut snapshot, &prefix);
        ui::success(&format!("Prefixed {resource_count} resources with '{prefix}_'"));
        if output_count > 0 {
            ui::success(&format!("Prefixed {output_count} outputs with '{prefix}_'"));
        }

        state::collect_providers(&snapshot, &mut provider_sources);
        state::strip_tag_attributes(&mut snapshot);

        state::merge_state(
            state::extract_resources(&snapshot),
            state::extract_outputs(&snapshot),
            &mut merged_resources,
            &mut merged_outputs,
        )
        .with_context(|| format!("failed to merge state for {rel}"))?;

        let local_version = state::extract_int(&snapshot, "version");
        let local_tf_version = state::extract_str(&snapshot, "terraform_version");
        let local_serial = state::extract_int(&snapshot, "serial");
        if index == 0 {
            base_version = local_version;
            base_tf_version = local_tf_version;
            serial = local_serial;
        } else {
            if local_version != base_version {
                ui::warn(&format!(
                    "{rel} state version {local_version} differs from base {base_version}"
                ));
                base_version = base_version.max(local_version);
            }
            if !local_tf_version.is_empty()
                && !base_tf_version.is_empty()
                && local_tf_version != base_tf_version
            {
                ui::warn(&format!(
                    "{rel} Terraform version {local_tf_version} differs from base {base_tf_version}"
                ));
            }
            serial = serial.max(local_serial);
        }
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before epoch")?;
    serial = serial.max(now.as_secs() as i64);
    let lineage = format!("superplan-{}", now.as_nanos());

    // S3: write the synthetic state document.
    let superplan_dir = paths::absolutize(&opts.output_dir).context("resolve output directory")?;
    fs::create_dir_all(&superplan_dir)
        .with_context(|| format!("unable to create output directory {}", superplan_dir.display()))?;
    let merged_dir = superplan_dir.join("merged");
    fs::create_dir_all(&merged_dir)
        .with_context(|| format!("unable to create merged directory {}", merged_dir.display()))?;

    let state_document = json!({
        "version": base_version,
        "terraform_version": base_tf_version,
        "serial": serial,
        "lineage": lineage,
        "outputs": Value::Object(merged_outputs),
        "resources": Value::Array(merged_resources),
    });
    let state_path = superplan_dir.join(STATE_FILE_NAME);
    write_json(&state_path, &state_document)?;
    ui::success(&format!(
        "Merged {} stack states into {}",
        order.len(),
        state_path.display()
    ));

    // S4: merge configurations.
    let config_providers =
        config::write_combined_configuration(&order, &prefixes, &root_abs, &merged_dir)
            .context("failed to build combined configuration")?;

    // S5: merge variable values.
    let (variable_values, sources_used) =
        vars::collect_variable_values(&root_abs, &opts.environment, &order)
            .context("failed to collect variable values")?;
    let var_file_path = merged_dir.join("variables.auto.tfvars");
    vars::write_tfvars_file(&var_file_path, &variable_values)
        .context("failed to write variables file")?;
    ui::success(&format!(
        "Wrote {} variable values from {sources_used} sources to {}",
        variable_values.len(),
        var_file_path.display()
    ));

    // S6: synthesize the terraform block.
    config::ensure_local_backend(&merged_dir, &provider_sources, &config_providers)
        .context("failed to prepare superplan configuration")?;

    // S7: run the preview in the merged workspace.
    runner
        .init_without_backend(&merged_dir)
        .context("terraform init failed in superplan directory")?;
    ui::success(&format!("Initialized local backend in {}", merged_dir.display()));

    config::patch_module_resource_lifecycle(&merged_dir)
        .context("failed to apply lifecycle ignore to modules")?;

    let plan_path = superplan_dir.join(PLAN_FILE_NAME);
    let plan_rel = PathBuf::from("..").join(PLAN_FILE_NAME);
    let state_rel = PathBuf::from("..").join(STATE_FILE_NAME);
    runner
        .plan_against_state(&merged_dir, &plan_rel, &state_rel)
        .context("terraform plan failed")?;
    ui::success(&format!("Generated unified plan ({PLAN_FILE_NAME})"));

    // S8: summarize, attributing changes back to stacks.
    let plan_json = runner
        .show_plan_json(&merged_dir, &plan_path)
        .context("terraform show plan failed")?;
    let plan: summary::PlanDocument = serde_json::from_str(&plan_json)
        .map_err(|err| anyhow!("parse plan JSON: {err}"))?;

    let report = summary::build_summary(
        &plan,
        &summary::SummaryContext {
            prefixes_by_rel,
            dependencies_by_rel,
            dependents_by_rel,
            prefix_to_stack,
            environment: opts.environment.clone(),
            account_id: opts.account_id.clone(),
            terraform_version: opts.terraform_version.clone(),
            generated_at: Utc::now(),
        },
    );

    let summary_path = superplan_dir.join(SUMMARY_FILE_NAME);
    let summary_value = serde_json::to_value(&report).context("marshal superplan summary")?;
    write_json(&summary_path, &summary_value)?;

    ui::success(&format!(
        "Superplan complete: {} stacks analyzed, {} with changes",
        report.total_stacks, report.stacks_with_changes
    ));

    // S9: cleanup, keeping superstate and summary.
    cleanup_artifacts(&merged_dir, &plan_path, opts.keep_plan_artifacts)
        .context("cleanup superplan artifacts")?;

    Ok(())
}

fn write_json(path: &std::path::Path, value: &Value) -> Result<()> {
    let data = serde_json::to_string_pretty(value).context("marshal JSON document")?;
    fs::write(path, data).with_context(|| format!("write {}", path.display()))
}

fn cleanup_artifacts(
    merged_dir: &std::path::Path,
    plan_path: &std::path::Path,
    keep: bool,
) -> Result<()> {
    if keep {
        return Ok(());
    }
    if merged_dir.exists() {
        fs::remove_dir_all(merged_dir)
            .with_context(|| format!("remove merged configuration {}", merged_dir.display()))?;
    }
    match fs::remove_file(plan_path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => {
            Err(err).with_context(|| format!("remove plan file {}", plan_path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cleanup_artifacts_keeps_when_requested() {
        let dir = TempDir::new().unwrap();
        let merged = dir.path().join("merged");
        fs::create_dir_all(&merged).unwrap();
        let plan = dir.path().join(PLAN_FILE_NAME);
        fs::write(&plan, b"plan").unwrap();

        cleanup_artifacts(&merged, &plan, true).unwrap();
        assert!(merged.exists());
        assert!(plan.exists());

        cleanup_artifacts(&merged, &plan, false).unwrap();
        assert!(!merged.exists());
        assert!(!plan.exists());

        // A second cleanup is a no-op.
        cleanup_artifacts(&merged, &plan, false).unwrap();
    }

    #[test]
    fn test_options_defaults() {
        let mut opts = Options::default();
        opts.apply_defaults();
        assert_eq!(opts.root_dir, PathBuf::from("."));
        assert_eq!(opts.output_dir, PathBuf::from("superplan"));
        assert_eq!(opts.environment, "dev");
        assert_eq!(opts.region, "eu-west-2");
    }

    #[test]
    fn test_run_requires_account_and_binary() {
        let dir = TempDir::new().unwrap();
        let err = run(Options {
            root_dir: dir.path().to_path_buf(),
            ..Options::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("account ID"));

        let err = run(Options {
            root_dir: dir.path().to_path_buf(),
            account_id: "123456789012".to_string(),
            ..Options::default()
        })
        .unwrap_err();
        assert!(err.to_string().contains("terraform binary path"));
    }
}
