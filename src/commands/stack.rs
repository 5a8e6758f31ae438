//! Single-stack operations: init, plan, apply, destroy.

use anyhow::Result;

use crate::executor;

use super::{summary_result, Context};

pub fn init(ctx: &Context, stack_arg: &str) -> Result<()> {
    let (_, index) = ctx.load_graph()?;
    let (stack, rel) = ctx.resolve_stack_arg(&index, stack_arg)?;

    let resolved = ctx.resolve_terraform(vec![stack.path.clone()])?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::init_stack(&stack, opts)?;
    summary_result("init", &summary)?;
    println!("stack initialised: {rel}");
    Ok(())
}

pub fn plan(ctx: &Context, stack_arg: &str) -> Result<()> {
    let (_, index) = ctx.load_graph()?;
    let (stack, rel) = ctx.resolve_stack_arg(&index, stack_arg)?;

    let resolved = ctx.resolve_terraform(vec![stack.path.clone()])?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::plan_stack(&stack, opts)?;
    summary_result("plan", &summary)?;
    println!("stack planned: {rel}");
    Ok(())
}

pub fn apply(ctx: &Context, stack_arg: &str) -> Result<()> {
    let (_, index) = ctx.load_graph()?;
    let (stack, rel) = ctx.resolve_stack_arg(&index, stack_arg)?;

    let resolved = ctx.resolve_terraform(vec![stack.path.clone()])?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::apply_stack(&stack, opts)?;
    summary_result("apply", &summary)?;
    println!("stack applied: {rel}");
    Ok(())
}

pub fn destroy(ctx: &Context, stack_arg: &str) -> Result<()> {
    let (_, index) = ctx.load_graph()?;
    let (stack, rel) = ctx.resolve_stack_arg(&index, stack_arg)?;

    let resolved = ctx.resolve_terraform(vec![stack.path.clone()])?;
    let opts = ctx.executor_options(&resolved)?;

    let summary = executor::destroy_stack(&stack, opts)?;
    summary_result("destroy", &summary)?;
    println!("stack destroyed: {rel}");
    Ok(())
}
