//! Extraction of `terraform.required_version` constraints from stack source.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use hcl_edit::expr::Expression;
use hcl_edit::structure::Body;
use walkdir::WalkDir;

use crate::paths;

use super::constraint;

pub const DEFAULT_CONSTRAINT: &str = ">= 1.0.0";

/// Walk each stack, collect `required_version` from unlabeled top-level
/// `terraform {}` blocks, and return the comma-joined constraint string per
/// relative stack path. Stacks without a constraint get the default.
pub fn detect_constraints(root: &Path, stack_paths: &[PathBuf]) -> Result<BTreeMap<String, String>> {
    let root_abs = paths::absolutize(root).context("resolve root path")?;

    let mut result = BTreeMap::new();
    for stack in stack_paths {
        if stack.as_os_str().is_empty() {
            continue;
        }
        let stack_abs = paths::absolutize(stack)
            .with_context(|| format!("resolve stack path {}", stack.display()))?;
        let rel = paths::rel_slash(&root_abs, &stack_abs);

        let constraints = detect_stack_constraints(&stack_abs)
            .with_context(|| format!("detect constraints for {rel}"))?;

        if constraints.is_empty() {
            result.insert(rel, DEFAULT_CONSTRAINT.to_string());
        } else {
            result.insert(rel, constraints.join(", "));
        }
    }

    Ok(result)
}

fn detect_stack_constraints(stack_dir: &Path) -> Result<Vec<String>> {
    let mut constraints = Vec::new();

    for entry in WalkDir::new(stack_dir) {
        let entry = entry.with_context(|| format!("walk {}", stack_dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("tf") {
            continue;
        }

        let src = fs::read_to_string(entry.path())
            .with_context(|| format!("read {}", entry.path().display()))?;
        let body: Body = src
            .parse()
            .map_err(|err| anyhow::anyhow!("parse {}: {err}", entry.path().display()))?;

        for block in body.iter().filter_map(|s| s.as_block()) {
            if block.ident.as_str() != "terraform" || !block.labels.is_empty() {
                continue;
            }
            let Some(attr) = block
                .body
                .iter()
                .filter_map(|s| s.as_attribute())
                .find(|attr| attr.key.as_str() == "required_version")
            else {
                continue;
            };

            let raw = match &attr.value {
                Expression::String(value) => value.trim().to_string(),
                _ => bail!(
                    "{}: required_version must be a string literal",
                    entry.path().display()
                ),
            };
            if raw.is_empty() {
                continue;
            }

            constraint::parse_constraint_set(&raw).with_context(|| {
                format!("{}: invalid required_version {raw:?}", entry.path().display())
            })?;

            if !constraints.contains(&raw) {
                constraints.push(raw);
            }
        }
    }

    Ok(constraints)
}
