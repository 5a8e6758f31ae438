//! The aggregate-preview command.

use anyhow::Result;

use crate::superplan;
use crate::ui;

use super::{graph_stack_paths, Context};

pub fn run(ctx: &Context) -> Result<()> {
    let (graph, _) = ctx.load_graph()?;
    let resolved = ctx.resolve_terraform(graph_stack_paths(&graph))?;

    let mut lock = ctx.orchestration_lock("superplan")?;
    if let Some(lock) = lock.as_mut() {
        lock.acquire(ctx.wait)?;
    }

    let result = superplan::run(superplan::Options {
        root_dir: ctx.root.clone(),
        output_dir: ctx.out.clone(),
        terraform_path: resolved.binary_path.clone(),
        terraform_version: resolved.version.to_string(),
        environment: ctx.environment.clone(),
        account_id: ctx.require_account_id()?.to_string(),
        region: ctx.region.clone(),
        keep_plan_artifacts: ctx.keep_plan_artifacts,
    });

    if let Some(mut lock) = lock {
        if let Err(err) = lock.release() {
            ui::warn(&format!("failed to release orchestration lock: {err:#}"));
        }
    }

    result
}
