//! Whole-graph operations driven by the layered executor.

use anyhow::{Context as AnyhowContext, Result};

use crate::executor;
use crate::ui;

use super::{graph_stack_paths, summary_result, Context};

pub fn init_all(ctx: &Context) -> Result<()> {
    let (graph, _) = ctx.load_graph()?;
    let resolved = ctx.resolve_terraform(graph_stack_paths(&graph))?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::init_all(&graph, opts)?;
    summary_result("init-all", &summary)
}

pub fn plan_all(ctx: &Context) -> Result<()> {
    let (graph, _) = ctx.load_graph()?;
    let resolved = ctx.resolve_terraform(graph_stack_paths(&graph))?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::plan_all(&graph, opts)?;
    summary_result("plan-all", &summary)
}

pub fn apply_all(ctx: &Context) -> Result<()> {
    let (graph, _) = ctx.load_graph()?;
    let resolved = ctx.resolve_terraform(graph_stack_paths(&graph))?;
    let opts = ctx.executor_options(&resolved)?;

    let mut lock = ctx.orchestration_lock("apply-all")?;
    if let Some(lock) = lock.as_mut() {
        lock.acquire(ctx.wait)?;
    }

    let result = executor::apply_all(&graph, opts);
    release_quietly(lock);

    summary_result("apply-all", &result?)
}

pub fn destroy_all(ctx: &Context) -> Result<()> {
    let (graph, _) = ctx.load_graph()?;

    if !ctx.yes && !confirm_destroy(&ctx.environment)? {
        ui::info("Aborted");
        return Ok(());
    }

    let resolved = ctx.resolve_terraform(graph_stack_paths(&graph))?;
    let opts = ctx.executor_options(&resolved)?;

    let mut lock = ctx.orchestration_lock("destroy-all")?;
    if let Some(lock) = lock.as_mut() {
        lock.acquire(ctx.wait)?;
    }

    let result = executor::destroy_all(&graph, opts);
    release_quietly(lock);

    summary_result("destroy-all", &result?)
}

fn confirm_destroy(environment: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(format!("Destroy every stack in {environment:?}?"))
        .default(false)
        .interact()
        .context("read confirmation")
}

fn release_quietly(lock: Option<crate::lock::OrchestrationLock>) {
    if let Some(mut lock) = lock {
        if let Err(err) = lock.release() {
            ui::warn(&format!("failed to release orchestration lock: {err:#}"));
        }
    }
}
