//! The terraform invocation boundary.
//!
//! The runner owns flag translation and nothing else: backend configuration
//! derived from account/region/environment, variable-file precedence, and
//! non-interactive execution. Stdout and stderr of the child process are
//! forwarded to the operator unmodified, except for the state-pull and
//! plan-show calls whose output is the data being collected.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};

use crate::cancel::CancelToken;
use crate::paths;

/// The subset of runner operations the executor schedules. Kept as a trait
/// so tests can substitute a recording fake without touching the
/// production path.
pub trait StackRunner: Send + Sync {
    fn init_only(&self, stack_dir: &Path, upgrade: bool) -> Result<()>;
    fn plan_with_output(&self, stack_dir: &Path, plan_path: &Path) -> Result<()>;
    fn apply(&self, stack_dir: &Path) -> Result<()>;
    fn destroy(&self, stack_dir: &Path) -> Result<()>;
    fn var_files_for(&self, stack_dir: &Path) -> Vec<PathBuf>;
}

#[derive(Debug, Clone, Default)]
pub struct RunnerOptions {
    pub root_dir: PathBuf,
    pub environment: String,
    pub account_id: String,
    pub region: String,
    pub terraform_path: PathBuf,
    pub disable_refresh: bool,
}

/// Process-invocation wrapper around a resolved terraform binary.
#[derive(Debug)]
pub struct Runner {
    terraform_path: PathBuf,
    root: PathBuf,
    environment: String,
    account_id: String,
    region: String,
    disable_refresh: bool,
    cancel: CancelToken,
}

impl Runner {
    pub fn new(cancel: CancelToken, mut opts: RunnerOptions) -> Result<Self> {
        if opts.root_dir.as_os_str().is_empty() {
            opts.root_dir = PathBuf::from(".");
        }
        if opts.environment.is_empty() {
            opts.environment = "dev".to_string();
        }
        if opts.region.is_empty() {
            opts.region = "eu-west-2".to_string();
        }
        if opts.account_id.is_empty() {
            bail!("account ID is required");
        }
        if opts.terraform_path.as_os_str().is_empty() {
            bail!("terraform binary path is required");
        }

        Ok(Self {
            terraform_path: opts.terraform_path,
            root: paths::absolutize(&opts.root_dir)?,
            environment: opts.environment,
            account_id: opts.account_id,
            region: opts.region,
            disable_refresh: opts.disable_refresh,
            cancel,
        })
    }

    /// `terraform init` against the stack's real backend.
    pub fn init(&self, stack_dir: &Path, upgrade: bool) -> Result<()> {
        let mut args = vec!["init".to_string(), "-input=false".to_string()];
        if upgrade {
            args.push("-upgrade".to_string());
        }
        for (key, value) in self.backend_config(stack_dir) {
            args.push(format!("-backend-config={key}={value}"));
        }

        self.run(stack_dir, &args, &[])
    }

    /// `terraform init -backend=false`, used for the merged superplan
    /// workspace.
    pub fn init_without_backend(&self, dir: &Path) -> Result<()> {
        self.run(
            dir,
            &[
                "init".to_string(),
                "-backend=false".to_string(),
                "-input=false".to_string(),
            ],
            &[],
        )
    }

    /// `terraform plan` against an explicit state file, for the merged
    /// superplan workspace.
    pub fn plan_against_state(&self, dir: &Path, out_path: &Path, state_path: &Path) -> Result<()> {
        self.run(
            dir,
            &[
                "plan".to_string(),
                format!("-out={}", out_path.display()),
                format!("-state={}", state_path.display()),
                "-refresh=false".to_string(),
                "-input=false".to_string(),
            ],
            &[("TF_INPUT".to_string(), "false".to_string())],
        )
    }

    /// `terraform state pull`, returning the raw snapshot JSON.
    pub fn state_pull(&self, stack_dir: &Path) -> Result<String> {
        self.run_capture(stack_dir, &["state".to_string(), "pull".to_string()])
    }

    /// `terraform show -json` over a saved plan file.
    pub fn show_plan_json(&self, dir: &Path, plan_path: &Path) -> Result<String> {
        self.run_capture(
            dir,
            &[
                "show".to_string(),
                "-json".to_string(),
                plan_path.display().to_string(),
            ],
        )
    }

    /// Backend configuration derived from the runner options:
    /// `{<account>-<region>-state, <env>/<stack>/terraform.tfstate, region, encrypt}`.
    pub fn backend_config(&self, stack_dir: &Path) -> BTreeMap<String, String> {
        let stack_name = stack_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut config = BTreeMap::new();
        config.insert(
            "bucket".to_string(),
            format!("{}-{}-state", self.account_id, self.region),
        );
        config.insert(
            "key".to_string(),
            format!("{}/{}/terraform.tfstate", self.environment, stack_name),
        );
        config.insert("region".to_string(), self.region.clone());
        config.insert("encrypt".to_string(), "true".to_string());
        config
    }

    fn plan_args(&self, stack_dir: &Path) -> Vec<String> {
        let mut args = vec!["-lock=false".to_string(), "-input=false".to_string()];
        if self.disable_refresh {
            args.push("-refresh=false".to_string());
        }
        for file in self.var_files_for(stack_dir) {
            args.push(format!("-var-file={}", file.display()));
        }
        args
    }

    fn var_file_args(&self, stack_dir: &Path) -> Vec<String> {
        self.var_files_for(stack_dir)
            .into_iter()
            .map(|file| format!("-var-file={}", file.display()))
            .collect()
    }

    fn run(&self, dir: &Path, args: &[String], env: &[(String, String)]) -> Result<()> {
        if self.cancel.is_cancelled() {
            bail!("operation cancelled");
        }

        let mut command = Command::new(&self.terraform_path);
        command
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for (key, value) in env {
            command.env(key, value);
        }

        let status = command.status().with_context(|| {
            format!(
                "failed to execute {} {}",
                self.terraform_path.display(),
                args.join(" ")
            )
        })?;

        if !status.success() {
            bail!(
                "terraform {} failed in {} (exit status {})",
                args.first().map(String::as_str).unwrap_or(""),
                dir.display(),
                status.code().unwrap_or(-1)
            );
        }
        Ok(())
    }

    fn run_capture(&self, dir: &Path, args: &[String]) -> Result<String> {
        if self.cancel.is_cancelled() {
            bail!("operation cancelled");
        }

        let output = Command::new(&self.terraform_path)
            .args(args)
            .current_dir(dir)
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| {
                format!(
                    "failed to execute {} {}",
                    self.terraform_path.display(),
                    args.join(" ")
                )
            })?;

        if !output.status.success() {
            bail!(
                "terraform {} failed in {} (exit status {})",
                args.first().map(String::as_str).unwrap_or(""),
                dir.display(),
                output.status.code().unwrap_or(-1)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl StackRunner for Runner {
    fn init_only(&self, stack_dir: &Path, upgrade: bool) -> Result<()> {
        self.init(stack_dir, upgrade)
    }

    fn plan_with_output(&self, stack_dir: &Path, plan_path: &Path) -> Result<()> {
        self.init(stack_dir, true)?;

        let mut args = vec!["plan".to_string(), format!("-out={}", plan_path.display())];
        args.extend(self.plan_args(stack_dir));
        self.run(stack_dir, &args, &[])
    }

    fn apply(&self, stack_dir: &Path) -> Result<()> {
        self.init(stack_dir, true)?;

        let mut args = vec![
            "apply".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
        ];
        args.extend(self.var_file_args(stack_dir));
        self.run(stack_dir, &args, &[])
    }

    fn destroy(&self, stack_dir: &Path) -> Result<()> {
        self.init(stack_dir, true)?;

        let mut args = vec![
            "destroy".to_string(),
            "-auto-approve".to_string(),
            "-input=false".to_string(),
        ];
        args.extend(self.var_file_args(stack_dir));
        self.run(stack_dir, &args, &[])
    }

    /// Variable files in precedence order: repo globals, environment file,
    /// stack-local file. Missing files are skipped.
    fn var_files_for(&self, stack_dir: &Path) -> Vec<PathBuf> {
        var_files(&self.root, stack_dir, &self.environment)
    }
}

/// Variable-file precedence shared with the superplan variable collector.
pub fn var_files(root: &Path, stack_dir: &Path, environment: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let global = root.join("globals.tfvars");
    if paths::file_exists(&global) {
        files.push(global);
    }

    let env_file = root.join("environment").join(format!("{environment}.tfvars"));
    if paths::file_exists(&env_file) {
        files.push(env_file);
    }

    let stack_file = stack_dir.join("tfvars").join(format!("{environment}.tfvars"));
    if paths::file_exists(&stack_file) {
        files.push(stack_file);
    }

    files
}
