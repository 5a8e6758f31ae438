//! Removal of per-stack `.terraform` artifacts and provider lock files.

use std::fs;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};

use super::Context;

pub fn clean(ctx: &Context, stack_arg: &str) -> Result<()> {
    let (_, index) = ctx.load_graph()?;
    let (stack, rel) = ctx.resolve_stack_arg(&index, stack_arg)?;

    clean_stack_artifacts(&stack.path)?;
    println!("[clean] removed .terraform artifacts for {rel}");
    Ok(())
}

pub fn clean_all(ctx: &Context) -> Result<()> {
    let (_, index) = ctx.load_graph()?;

    for (rel, stack) in &index {
        clean_stack_artifacts(&stack.path)?;
        println!("[clean] removed .terraform artifacts for {rel}");
    }
    Ok(())
}

fn clean_stack_artifacts(stack_path: &Path) -> Result<()> {
    let terraform_dir = stack_path.join(".terraform");
    if terraform_dir.exists() {
        fs::remove_dir_all(&terraform_dir)
            .with_context(|| format!("remove {}", terraform_dir.display()))?;
    }

    for lock_file in ["terraform.lock.hcl", ".terraform.lock.hcl"] {
        let lock_path = stack_path.join(lock_file);
        match fs::remove_file(&lock_path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| format!("remove {}", lock_path.display()));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clean_stack_artifacts() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join(".terraform").join("providers");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(".terraform.lock.hcl"), "lock").unwrap();
        fs::write(dir.path().join("main.tf"), "terraform {}").unwrap();

        clean_stack_artifacts(dir.path()).unwrap();

        assert!(!dir.path().join(".terraform").exists());
        assert!(!dir.path().join(".terraform.lock.hcl").exists());
        assert!(dir.path().join("main.tf").exists());
    }

    #[test]
    fn test_clean_missing_artifacts_is_noop() {
        let dir = TempDir::new().unwrap();
        clean_stack_artifacts(dir.path()).unwrap();
    }
}
