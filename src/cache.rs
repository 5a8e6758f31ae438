//! Content-addressed plan cache.
//!
//! A cache entry for `(root, environment, stack)` is a directory holding the
//! plan artifact and a hex-encoded SHA-256 fingerprint of the inputs that
//! produced it. Files are hashed in sorted-path order so enumeration order
//! never changes the fingerprint.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

const PLAN_FILE: &str = "plan.tfplan";
const HASH_FILE: &str = "plan.hash";

/// Cache directory for a stack: `<root>/.terraform-wrapper/cache/<env>/<stack>`.
pub fn plan_dir(root: &Path, environment: &str, stack_rel: &str) -> PathBuf {
    root.join(".terraform-wrapper")
        .join("cache")
        .join(environment)
        .join(stack_rel)
}

/// Paths of the plan artifact and its fingerprint file.
pub fn plan_files(root: &Path, environment: &str, stack_rel: &str) -> (PathBuf, PathBuf) {
    let dir = plan_dir(root, environment, stack_rel);
    (dir.join(PLAN_FILE), dir.join(HASH_FILE))
}

/// Persist a fingerprint, creating the cache directory if needed.
pub fn save_hash(path: &Path, hash: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create cache dir {}", dir.display()))?;
    }
    fs::write(path, hex::encode(hash)).with_context(|| format!("write {}", path.display()))
}

/// Load a previously persisted fingerprint.
pub fn load_hash(path: &Path) -> Result<Vec<u8>> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    hex::decode(data.trim()).with_context(|| format!("decode {}", path.display()))
}

/// SHA-256 over the contents of `files`, visited in sorted-path order.
pub fn compute_hash(files: &[PathBuf]) -> Result<Vec<u8>> {
    let mut sorted = files.to_vec();
    sorted.sort();

    let mut hasher = Sha256::new();
    for path in &sorted {
        let data = fs::read(path).with_context(|| format!("hash {}", path.display()))?;
        hasher.update(&data);
    }
    Ok(hasher.finalize().to_vec())
}

/// Enumerate the files that feed a stack's fingerprint: every `.tf` and
/// `.tfvars` under the stack (ignoring any `.terraform` subtree), plus the
/// supplied extra files (external variable files).
pub fn stack_content_files(stack_dir: &Path, extras: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(stack_dir).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir() && entry.file_name() == ".terraform")
    });
    for entry in walker {
        let entry = entry.with_context(|| format!("walk {}", stack_dir.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        match entry.path().extension().and_then(|e| e.to_str()) {
            Some("tf") | Some("tfvars") => files.push(entry.path().to_path_buf()),
            _ => {}
        }
    }

    files.extend(extras.iter().cloned());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_plan_dir_and_files() {
        let root = Path::new("/repo");
        let dir = plan_dir(root, "dev", "network/vpc");
        assert_eq!(
            dir,
            PathBuf::from("/repo/.terraform-wrapper/cache/dev/network/vpc")
        );

        let (plan, hash) = plan_files(root, "dev", "network/vpc");
        assert_eq!(plan, dir.join("plan.tfplan"));
        assert_eq!(hash, dir.join("plan.hash"));
    }

    #[test]
    fn test_save_and_load_hash() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("plan.hash");
        let digest = vec![0xab; 32];

        save_hash(&path, &digest).unwrap();
        assert_eq!(load_hash(&path).unwrap(), digest);
    }

    #[test]
    fn test_compute_hash_detects_changes() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main.tf");
        let vars = dir.path().join("vars.tf");
        fs::write(&main, "terraform {}").unwrap();
        fs::write(&vars, "variable \"name\" {}").unwrap();

        let files = vec![main.clone(), vars.clone()];
        let first = compute_hash(&files).unwrap();
        assert_eq!(first.len(), 32);

        // Ordering of the input list must not matter.
        let reversed = vec![vars.clone(), main.clone()];
        assert_eq!(compute_hash(&reversed).unwrap(), first);

        // Any byte change must invalidate the fingerprint.
        fs::write(&main, "terraform {} # changed").unwrap();
        assert_ne!(compute_hash(&files).unwrap(), first);
    }

    #[test]
    fn test_stack_content_files_skips_terraform_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.tf"), "terraform {}").unwrap();
        fs::write(dir.path().join("inputs.tfvars"), "name = \"x\"").unwrap();
        fs::write(dir.path().join("README.md"), "docs").unwrap();

        let hidden = dir.path().join(".terraform").join("modules");
        fs::create_dir_all(&hidden).unwrap();
        fs::write(hidden.join("cached.tf"), "resource \"x\" \"y\" {}").unwrap();

        let extra = dir.path().join("globals.tfvars");
        fs::write(&extra, "env = \"dev\"").unwrap();

        let mut files = stack_content_files(dir.path(), &[extra.clone()]).unwrap();
        files.sort();

        assert!(files.contains(&dir.path().join("main.tf")));
        assert!(files.contains(&dir.path().join("inputs.tfvars")));
        assert!(files.contains(&extra));
        assert!(!files.iter().any(|p| p.starts_with(dir.path().join(".terraform"))));
        assert!(!files.contains(&dir.path().join("README.md")));
    }
}
