//! Command implementations and the shared context they run in.

pub mod all;
pub mod clean;
pub mod stack;
pub mod superplan;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context as AnyhowContext, Result};
use semver::Version;

use crate::cli::Cli;
use crate::executor::{Options, Summary};
use crate::graph::{self, Stack, StackGraph};
use crate::lock::OrchestrationLock;
use crate::paths;
use crate::versioning::{self, constraint, ResolveOptions, ResolveResult};

/// Per-invocation context derived from the CLI flags.
#[derive(Debug)]
pub struct Context {
    pub root: PathBuf,
    pub environment: String,
    pub account_id: Option<String>,
    pub region: String,
    pub out: PathBuf,
    pub parallelism: usize,
    pub cache: bool,
    pub force_plan: Vec<String>,
    pub keep_plan_artifacts: bool,
    pub refresh: bool,
    pub wait: bool,
    pub no_lock: bool,
    pub yes: bool,
    pub terraform_version: Option<Version>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let environment = cli
            .env_alias
            .clone()
            .or_else(|| cli.environment.clone())
            .filter(|env| !env.is_empty())
            .ok_or_else(|| anyhow!("environment must be specified via --environment or --env"))?;

        let terraform_version = match &cli.terraform_version {
            Some(raw) => Some(
                constraint::parse_lenient_version(raw)
                    .with_context(|| format!("invalid --terraform-version {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            root: cli.root.clone(),
            environment,
            account_id: cli.account_id.clone().filter(|id| !id.is_empty()),
            region: cli.region.clone(),
            out: cli.out.clone(),
            parallelism: if cli.parallelism == 0 { 4 } else { cli.parallelism },
            cache: cli.cache,
            force_plan: cli.force_plan.clone(),
            keep_plan_artifacts: cli.keep_plan_artifacts,
            refresh: cli.refresh,
            wait: cli.wait,
            no_lock: cli.no_lock,
            yes: cli.yes,
            terraform_version,
        })
    }

    /// Commands that talk to a backend need the account identity; it is an
    /// external input here (identity lookup is out of scope).
    pub fn require_account_id(&self) -> Result<&str> {
        self.account_id
            .as_deref()
            .ok_or_else(|| anyhow!("--account-id is required for this command"))
    }

    pub fn state_bucket(&self) -> Result<String> {
        Ok(format!("{}-{}-state", self.require_account_id()?, self.region))
    }

    pub fn executor_options(&self, resolved: &ResolveResult) -> Result<Options> {
        let mut force_stacks = std::collections::HashSet::new();
        for name in &self.force_plan {
            let rel = self.normalize_stack_name(name)?;
            if !rel.is_empty() {
                force_stacks.insert(rel);
            }
        }

        Ok(Options {
            root_dir: self.root.clone(),
            environment: self.environment.clone(),
            account_id: self.require_account_id()?.to_string(),
            region: self.region.clone(),
            terraform_path: resolved.binary_path.clone(),
            terraform_version: resolved.version.to_string(),
            parallelism: self.parallelism,
            use_cache: self.cache,
            force_stacks,
            disable_refresh: !self.refresh,
        })
    }

    pub fn resolve_terraform(&self, stack_paths: Vec<PathBuf>) -> Result<ResolveResult> {
        if stack_paths.is_empty() {
            bail!("no stacks provided for Terraform resolution");
        }
        versioning::resolve_terraform_binary(ResolveOptions {
            root_dir: self.root.clone(),
            stack_paths,
            lock_file_path: None,
            force_install: env_bool("TFWRAPPER_FORCE_INSTALL"),
            use_system_only: env_bool("TFWRAPPER_USE_SYSTEM_TERRAFORM"),
            disable_install: env_bool("TFWRAPPER_DISABLE_INSTALL"),
            pinned_version: self.terraform_version.clone(),
        })
    }

    /// Build the graph plus a relative-path index for stack lookups.
    pub fn load_graph(&self) -> Result<(StackGraph, BTreeMap<String, Stack>)> {
        let root_abs = paths::absolutize(&self.root)?;
        let graph = graph::build(&root_abs)?;

        let mut index = BTreeMap::new();
        for (path, stack) in &graph {
            index.insert(paths::rel_slash(&root_abs, path), stack.clone());
        }
        Ok((graph, index))
    }

    pub fn normalize_stack_name(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Ok(String::new());
        }
        let root_abs = paths::absolutize(&self.root)?;
        let abs = if Path::new(name).is_absolute() {
            paths::clean(Path::new(name))
        } else {
            paths::clean(&root_abs.join(name))
        };
        Ok(paths::rel_slash(&root_abs, &abs))
    }

    /// Resolve `--stack`: exact relative path, normalized path, or unique
    /// directory basename.
    pub fn resolve_stack_arg(
        &self,
        index: &BTreeMap<String, Stack>,
        input: &str,
    ) -> Result<(Stack, String)> {
        if input.is_empty() {
            bail!("--stack is required");
        }
        if let Some(stack) = index.get(input) {
            return Ok((stack.clone(), input.to_string()));
        }

        let rel = self.normalize_stack_name(input)?;
        if let Some(stack) = index.get(&rel) {
            return Ok((stack.clone(), rel));
        }

        let matches: Vec<(&String, &Stack)> = index
            .iter()
            .filter(|(rel_path, _)| {
                Path::new(rel_path)
                    .file_name()
                    .map(|base| base == std::ffi::OsStr::new(input))
                    .unwrap_or(false)
            })
            .collect();

        match matches.len() {
            1 => Ok((matches[0].1.clone(), matches[0].0.clone())),
            0 => bail!("stack {input:?} not found"),
            _ => {
                let rels: Vec<&str> = matches.iter().map(|(rel, _)| rel.as_str()).collect();
                bail!("stack {input:?} is ambiguous ({})", rels.join(", "))
            }
        }
    }

    /// Build the orchestration lock over the account's state bucket, unless
    /// `--no-lock` was passed.
    pub fn orchestration_lock(&self, command: &str) -> Result<Option<OrchestrationLock>> {
        if self.no_lock {
            return Ok(None);
        }
        let bucket = self.state_bucket()?;
        let store = objstore::S3Store::new(&bucket, &self.region)
            .map_err(|err| anyhow!("build lock store: {err}"))?;
        let lock = OrchestrationLock::new(Box::new(store), &self.environment, command)?;
        Ok(Some(lock))
    }
}

/// Booleans from the environment, parsed permissively.
pub fn env_bool(key: &str) -> bool {
    match std::env::var(key) {
        Ok(raw) => matches!(
            raw.trim().to_ascii_lowercase().as_str(),
            "1" | "t" | "true" | "y" | "yes" | "on"
        ),
        Err(_) => false,
    }
}

fn print_summary(label: &str, summary: &Summary) {
    println!(
        "[{label}] executed={} cached={} skipped={}",
        summary.executed, summary.cached, summary.skipped
    );
    if !summary.failed.is_empty() {
        println!("Failures:");
        for (stack, err) in &summary.failed {
            println!("  {stack}: {err}");
        }
    }
}

/// Convert a summary with failures into a command error.
pub fn summary_result(label: &str, summary: &Summary) -> Result<()> {
    print_summary(label, summary);
    if summary.is_success() {
        Ok(())
    } else {
        bail!("{} stack(s) failed during {label}", summary.failed.len())
    }
}

pub fn graph_stack_paths(graph: &StackGraph) -> Vec<PathBuf> {
    graph.keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["terraform-wrapper"];
        full.extend_from_slice(args);
        Cli::parse_from(full)
    }

    #[test]
    fn test_environment_alias_wins() {
        let ctx = Context::from_cli(&cli(&[
            "--environment",
            "prod",
            "--env",
            "dev",
            "plan-all",
        ]))
        .unwrap();
        assert_eq!(ctx.environment, "dev");

        let err = Context::from_cli(&cli(&["plan-all"])).unwrap_err();
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn test_invalid_pin_is_rejected() {
        let err = Context::from_cli(&cli(&[
            "--env",
            "dev",
            "--terraform-version",
            "not-a-version",
            "plan-all",
        ]))
        .unwrap_err();
        assert!(format!("{err:#}").contains("--terraform-version"));
    }

    #[test]
    fn test_env_bool_is_permissive() {
        std::env::set_var("TFWRAPPER_TEST_FLAG", "TRUE");
        assert!(env_bool("TFWRAPPER_TEST_FLAG"));
        std::env::set_var("TFWRAPPER_TEST_FLAG", "yes");
        assert!(env_bool("TFWRAPPER_TEST_FLAG"));
        std::env::set_var("TFWRAPPER_TEST_FLAG", "0");
        assert!(!env_bool("TFWRAPPER_TEST_FLAG"));
        std::env::set_var("TFWRAPPER_TEST_FLAG", "nope");
        assert!(!env_bool("TFWRAPPER_TEST_FLAG"));
        std::env::remove_var("TFWRAPPER_TEST_FLAG");
        assert!(!env_bool("TFWRAPPER_TEST_FLAG"));
    }

    #[test]
    fn test_resolve_stack_arg() {
        let root = TempDir::new().unwrap();
        for rel in ["network/vpc", "network/dns", "app"] {
            let dir = root.path().join(rel);
            fs::create_dir_all(&dir).unwrap();
            fs::write(
                dir.join("dependencies.json"),
                r#"{"dependencies": {"paths": []}}"#,
            )
            .unwrap();
        }

        let ctx = Context::from_cli(&cli(&[
            "--env",
            "dev",
            "--root",
            root.path().to_str().unwrap(),
            "plan-all",
        ]))
        .unwrap();
        let (_, index) = ctx.load_graph().unwrap();

        let (_, rel) = ctx.resolve_stack_arg(&index, "network/vpc").unwrap();
        assert_eq!(rel, "network/vpc");

        // Unique basename lookup.
        let (_, rel) = ctx.resolve_stack_arg(&index, "vpc").unwrap();
        assert_eq!(rel, "network/vpc");

        let err = ctx.resolve_stack_arg(&index, "missing").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_account_required_for_backend_commands() {
        let ctx = Context::from_cli(&cli(&["--env", "dev", "plan-all"])).unwrap();
        assert!(ctx.require_account_id().is_err());

        let ctx = Context::from_cli(&cli(&[
            "--env",
            "dev",
            "--account-id",
            "123456789012",
            "plan-all",
        ]))
        .unwrap();
        assert_eq!(ctx.require_account_id().unwrap(), "123456789012");
        assert_eq!(ctx.state_bucket().unwrap(), "123456789012-eu-west-2-state");
    }
}
