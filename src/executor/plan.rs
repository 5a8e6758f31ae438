//! Plan execution with cache-aware reuse.
//!
//! A stack's final fingerprint is the SHA-256 of its base content digest
//! concatenated with the final fingerprints of its direct dependencies,
//! which earlier topological layers have already recorded in the shared
//! hash map. A cache hit requires both an unchanged fingerprint and a
//! present plan artifact.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};

use crate::cache;
use crate::cancel::CancelToken;
use crate::graph::Stack;
use crate::paths;
use crate::progress::Manager;
use crate::runner::StackRunner;

use super::{Options, RunnerFactory, Status, Summary};

pub(super) fn plan_stack_cached(
    runner: &dyn StackRunner,
    stack: &Stack,
    rel: &str,
    opts: &Options,
    plan_hashes: &Mutex<HashMap<PathBuf, Vec<u8>>>,
) -> Result<Status> {
    let base = base_fingerprint(runner, stack)?;

    let mut hasher = Sha256::new();
    hasher.update(&base);
    {
        let hashes = plan_hashes.lock().expect("plan hash map poisoned");
        for dep in &stack.dependencies {
            if let Some(dep_hash) = hashes.get(dep) {
                hasher.update(dep_hash);
            }
        }
    }
    let fingerprint = hasher.finalize().to_vec();

    let status = run_plan(runner, stack, rel, opts, &fingerprint)?;
    plan_hashes
        .lock()
        .expect("plan hash map poisoned")
        .insert(stack.path.clone(), fingerprint);
    Ok(status)
}

/// Single-stack plan entry point; the fingerprint covers the stack's own
/// content only.
pub(super) fn plan_stack_with(
    stack: &Stack,
    mut opts: Options,
    factory: RunnerFactory,
) -> Result<Summary> {
    opts.defaults();
    if opts.terraform_path.as_os_str().is_empty() {
        bail!("terraform binary path not provided");
    }

    let root_abs = paths::absolutize(&opts.root_dir)?;
    let rel = paths::rel_slash(&root_abs, &stack.path);

    let progress = Manager::new();
    progress.register(&rel);
    progress.start(&rel);

    let cancel = CancelToken::new();
    let runner = (factory)(cancel, opts.runner_options())?;

    let result = base_fingerprint(runner.as_ref(), stack)
        .and_then(|fingerprint| run_plan(runner.as_ref(), stack, &rel, &opts, &fingerprint));

    match result {
        Err(err) => {
            let message = format!("{err:#}");
            progress.fail(&rel, &message);
            let mut summary = Summary::default();
            summary.failed.insert(rel, message);
            Ok(summary)
        }
        Ok(Status::Cached) => {
            progress.skip(&rel, "cache hit");
            Ok(Summary {
                cached: 1,
                ..Summary::default()
            })
        }
        Ok(_) => {
            progress.succeed(&rel);
            Ok(Summary {
                executed: 1,
                ..Summary::default()
            })
        }
    }
}

fn base_fingerprint(runner: &dyn StackRunner, stack: &Stack) -> Result<Vec<u8>> {
    let var_files = runner.var_files_for(&stack.path);
    let content_files = cache::stack_content_files(&stack.path, &var_files)?;
    cache::compute_hash(&content_files)
}

fn run_plan(
    runner: &dyn StackRunner,
    stack: &Stack,
    rel: &str,
    opts: &Options,
    fingerprint: &[u8],
) -> Result<Status> {
    let root_abs = paths::absolutize(&opts.root_dir)?;
    let (plan_path, hash_path) = cache::plan_files(&root_abs, &opts.environment, rel);

    if opts.use_cache && !opts.is_forced(rel) {
        if let Ok(cached) = cache::load_hash(&hash_path) {
            if cached == fingerprint && plan_path.is_file() {
                return Ok(Status::Cached);
            }
        }
    }

    if let Some(dir) = plan_path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    runner.plan_with_output(&stack.path, &plan_path)?;
    cache::save_hash(&hash_path, fingerprint)?;
    Ok(Status::Executed)
}
